//! Playback history
//!
//! A plain stack of the songs that were played. Entries are shared references,
//! so a song deleted from the playlist can still show up here, and a quick
//! sort or shuffle that rewrites a node's fields shows through as well.

use crate::playlist::SongRef;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct PlaybackHistory {
    /// Most recent = back
    stack: Vec<SongRef>,
}

impl PlaybackHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self, song: SongRef) {
        info!("Now playing: {}", song.borrow().display_line());
        self.stack.push(song);
    }

    /// Pop the last played song, or `None` if nothing has been played
    pub fn undo_last_play(&mut self) -> Option<SongRef> {
        let song = self.stack.pop();
        match &song {
            Some(song) => info!("Undo last play: {}", song.borrow().display_line()),
            None => debug!("Nothing to undo"),
        }
        song
    }

    /// Most recently played first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &SongRef> + ExactSizeIterator {
        self.stack.iter().rev()
    }

    pub fn peek(&self) -> Option<&SongRef> {
        self.stack.last()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::Song;

    fn song(title: &str) -> SongRef {
        Song::new(title, "Artist", 200).into_ref()
    }

    #[test]
    fn test_play_and_undo_order() {
        let mut history = PlaybackHistory::new();
        assert!(history.undo_last_play().is_none());

        history.play(song("A"));
        history.play(song("B"));
        history.play(song("C"));

        let order: Vec<String> = history.history().map(|s| s.borrow().title.clone()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        assert_eq!(history.peek().unwrap().borrow().title, "C");

        assert_eq!(history.undo_last_play().unwrap().borrow().title, "C");
        assert_eq!(history.undo_last_play().unwrap().borrow().title, "B");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_same_song_played_twice() {
        let mut history = PlaybackHistory::new();
        let track = song("Repeat");
        history.play(track.clone());
        history.play(track.clone());
        assert_eq!(history.len(), 2);

        let entries: Vec<&SongRef> = history.history().collect();
        assert!(std::rc::Rc::ptr_eq(entries[0], entries[1]));

        history.clear();
        assert!(history.is_empty());
    }
}
