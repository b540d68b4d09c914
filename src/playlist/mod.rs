// Playlist engine - a doubly linked list of songs
// Nodes live in an arena owned by the playlist; prev/next are plain indices,
// so the list is the only owner and links never keep a node alive.

pub mod shuffle;
pub mod song;
pub mod sort;

pub use shuffle::shuffle_unpinned;
pub use song::{format_duration, parse_duration, Song, SongId, SongRef};
pub use sort::{sort_by_name, sort_playlist, SortAlgorithm, SortKey};

use crate::error::{PlayWiseError, Result};
use tracing::{debug, info, warn};

type NodeId = usize;

#[derive(Debug)]
struct Node {
    song: SongRef,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Ordered, mutable sequence of songs
#[derive(Debug)]
pub struct Playlist {
    name: String,
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>, // released arena slots, reused by add_song
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        info!("Renamed playlist '{}' to '{}'", self.name, name);
        self.name = name;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Append a song at the tail. The duration is parsed before anything is
    /// allocated, so a bad "mm:ss" leaves the playlist untouched.
    pub fn add_song(&mut self, title: &str, artist: &str, duration: &str) -> Result<SongRef> {
        let duration_secs = parse_duration(duration).map_err(|e| {
            warn!("Rejected '{}' for playlist '{}': {}", title, self.name, e);
            e
        })?;

        let song = Song::new(title, artist, duration_secs).into_ref();
        let old_tail = self.tail;
        let id = self.alloc(Node {
            song: song.clone(),
            prev: old_tail,
            next: None,
        });

        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;

        info!(
            "Added '{}' by '{}' to '{}' ({})",
            title,
            artist,
            self.name,
            format_duration(duration_secs)
        );
        Ok(song)
    }

    /// Remove the song at `index` (0-based) and hand it back
    pub fn delete_song(&mut self, index: usize) -> Result<SongRef> {
        let id = self.node_at(index)?;
        self.unlink(id);

        let node = self.nodes[id].take().expect("unlinked node is still in the arena");
        self.free.push(id);

        info!("Deleted '{}' from '{}'", node.song.borrow().display_line(), self.name);
        Ok(node.song)
    }

    /// Move the song at `from` so that it ends up at position `to`.
    /// `to` is counted in the list with the moved song already taken out,
    /// walking again from the head.
    pub fn move_song(&mut self, from: usize, to: usize) -> Result<()> {
        if to >= self.len {
            return Err(PlayWiseError::IndexOutOfRange { index: to, len: self.len });
        }
        let id = self.node_at(from)?;
        if from == to {
            debug!("Song already at position {} in '{}'", to, self.name);
            return Ok(());
        }

        self.unlink(id);
        self.insert_at(id, to);

        info!(
            "Moved '{}' from {} to {} in '{}'",
            self.node(id).song.borrow().title,
            from,
            to,
            self.name
        );
        Ok(())
    }

    /// Reverse in place by swapping every node's links, then head and tail
    pub fn reverse(&mut self) {
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.node_mut(id);
            std::mem::swap(&mut node.prev, &mut node.next);
            current = node.prev; // the old next
        }
        std::mem::swap(&mut self.head, &mut self.tail);
        info!("Reversed '{}'", self.name);
    }

    /// Songs from head to tail. Calling it again starts over.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            playlist: self,
            cursor: self.head,
            remaining: self.len,
            step: |node| node.next,
        }
    }

    /// Songs from tail to head
    pub fn iter_rev(&self) -> Iter<'_> {
        Iter {
            playlist: self,
            cursor: self.tail,
            remaining: self.len,
            step: |node| node.prev,
        }
    }

    pub fn get(&self, index: usize) -> Option<&SongRef> {
        self.node_at(index).ok().map(|id| &self.node(id).song)
    }

    pub fn set_pinned(&mut self, index: usize, pinned: bool) -> Result<SongRef> {
        let id = self.node_at(index)?;
        let song = self.node(id).song.clone();
        song.borrow_mut().pinned = pinned;
        info!(
            "{} '{}' at position {}",
            if pinned { "Pinned" } else { "Unpinned" },
            song.borrow().title,
            index
        );
        Ok(song)
    }

    /// Sum of all durations in seconds
    pub fn total_duration(&self) -> u64 {
        self.iter().map(|song| song.borrow().duration_secs).sum()
    }

    /// Walks the list both ways and confirms the links agree with each other
    /// and with `len`.
    pub fn check_links(&self) -> bool {
        if self.head.is_none() != (self.len == 0) || self.head.is_none() != self.tail.is_none() {
            return false;
        }
        if let Some(head) = self.head {
            if self.node(head).prev.is_some() {
                return false;
            }
        }
        if let Some(tail) = self.tail {
            if self.node(tail).next.is_some() {
                return false;
            }
        }

        let mut forward = Vec::with_capacity(self.len);
        let mut current = self.head;
        while let Some(id) = current {
            if forward.len() > self.len {
                return false; // cycle
            }
            forward.push(id);
            current = self.node(id).next;
        }
        if forward.len() != self.len || forward.last().copied() != self.tail {
            return false;
        }

        let mut backward = Vec::with_capacity(self.len);
        let mut current = self.tail;
        while let Some(id) = current {
            if backward.len() > self.len {
                return false;
            }
            backward.push(id);
            current = self.node(id).prev;
        }
        backward.reverse();
        forward == backward
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id].as_ref().expect("linked node id points at a live slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id].as_mut().expect("linked node id points at a live slot")
    }

    fn node_at(&self, index: usize) -> Result<NodeId> {
        if index >= self.len {
            return Err(PlayWiseError::IndexOutOfRange { index, len: self.len });
        }
        let mut id = self.head.expect("non-empty playlist has a head");
        for _ in 0..index {
            id = self.node(id).next.expect("index within len has a successor");
        }
        Ok(id)
    }

    /// Detach a node from its neighbours; the arena slot stays occupied
    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = {
            let node = self.node(id);
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(id);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    /// Link a detached node so it sits at `position` (0..=len)
    fn insert_at(&mut self, id: NodeId, position: usize) {
        if position == 0 {
            let old_head = self.head;
            {
                let node = self.node_mut(id);
                node.prev = None;
                node.next = old_head;
            }
            match old_head {
                Some(h) => self.node_mut(h).prev = Some(id),
                None => self.tail = Some(id),
            }
            self.head = Some(id);
        } else {
            let mut before = self.head.expect("position > 0 needs a head");
            for _ in 0..position - 1 {
                before = self.node(before).next.expect("position within len");
            }
            let after = self.node(before).next;
            {
                let node = self.node_mut(id);
                node.prev = Some(before);
                node.next = after;
            }
            self.node_mut(before).next = Some(id);
            match after {
                Some(a) => self.node_mut(a).prev = Some(id),
                None => self.tail = Some(id),
            }
        }
        self.len += 1;
    }

    /// Recompute prev links, tail and len from the forward chain.
    /// Sorting only trusts `next`, so this must run after every sort.
    fn rebuild_back_links(&mut self) {
        let mut prev = None;
        let mut count = 0;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.node_mut(id);
            node.prev = prev;
            prev = Some(id);
            current = node.next;
            count += 1;
        }
        self.tail = prev;
        self.len = count;
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new("My Playlist")
    }
}

pub struct Iter<'a> {
    playlist: &'a Playlist,
    cursor: Option<NodeId>,
    remaining: usize,
    step: fn(&Node) -> Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SongRef;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.playlist.node(id);
        self.cursor = (self.step)(node);
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.song)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a SongRef;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(playlist: &Playlist) -> Vec<String> {
        playlist.iter().map(|s| s.borrow().title.clone()).collect()
    }

    fn sample(names: &[&str]) -> Playlist {
        let mut playlist = Playlist::new("Test");
        for (i, name) in names.iter().enumerate() {
            playlist.add_song(name, "Artist", &format!("{}:{:02}", i, 10)).unwrap();
        }
        playlist
    }

    #[test]
    fn test_add_song() {
        let mut playlist = Playlist::new("Road Trip");
        assert!(playlist.is_empty());

        let song = playlist.add_song("Blinding Lights", "The Weeknd", "3:20").unwrap();
        assert_eq!(song.borrow().duration_secs, 200);
        assert!(!song.borrow().pinned);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.name(), "Road Trip");
        assert!(playlist.check_links());
    }

    #[test]
    fn test_add_song_invalid_duration_leaves_list_alone() {
        let mut playlist = sample(&["A"]);
        let err = playlist.add_song("B", "Y", "three minutes").unwrap_err();
        assert!(matches!(err, PlayWiseError::InvalidDuration(_)));
        assert_eq!(playlist.len(), 1);
        assert_eq!(titles(&playlist), vec!["A"]);
    }

    #[test]
    fn test_delete_head_middle_tail() {
        let mut playlist = sample(&["A", "B", "C", "D"]);

        assert_eq!(playlist.delete_song(0).unwrap().borrow().title, "A");
        assert_eq!(titles(&playlist), vec!["B", "C", "D"]);
        assert!(playlist.check_links());

        assert_eq!(playlist.delete_song(1).unwrap().borrow().title, "C");
        assert_eq!(titles(&playlist), vec!["B", "D"]);

        assert_eq!(playlist.delete_song(1).unwrap().borrow().title, "D");
        assert_eq!(titles(&playlist), vec!["B"]);
        assert!(playlist.check_links());

        playlist.delete_song(0).unwrap();
        assert!(playlist.is_empty());
        assert!(playlist.check_links());
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut playlist = sample(&["A", "B"]);
        let err = playlist.delete_song(2).unwrap_err();
        assert!(matches!(err, PlayWiseError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn test_deleted_slot_is_reused() {
        let mut playlist = sample(&["A", "B", "C"]);
        playlist.delete_song(1).unwrap();
        playlist.add_song("D", "Artist", "1:00").unwrap();
        assert_eq!(playlist.nodes.len(), 3);
        assert_eq!(titles(&playlist), vec!["A", "C", "D"]);
        assert!(playlist.check_links());
    }

    #[test]
    fn test_move_song() {
        let mut playlist = sample(&["A", "B", "C"]);
        playlist.move_song(2, 0).unwrap();
        assert_eq!(titles(&playlist), vec!["C", "A", "B"]);
        assert!(playlist.check_links());

        playlist.move_song(0, 2).unwrap();
        assert_eq!(titles(&playlist), vec!["A", "B", "C"]);
        assert!(playlist.check_links());

        playlist.move_song(0, 1).unwrap();
        assert_eq!(titles(&playlist), vec!["B", "A", "C"]);

        playlist.move_song(1, 1).unwrap();
        assert_eq!(titles(&playlist), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_move_song_out_of_range() {
        let mut playlist = sample(&["A", "B", "C"]);
        assert!(playlist.move_song(3, 0).is_err());
        assert!(playlist.move_song(0, 3).is_err());
        assert_eq!(titles(&playlist), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_reverse() {
        let mut playlist = sample(&["A", "B", "C", "D"]);
        playlist.reverse();
        assert_eq!(titles(&playlist), vec!["D", "C", "B", "A"]);
        assert!(playlist.check_links());

        playlist.reverse();
        assert_eq!(titles(&playlist), vec!["A", "B", "C", "D"]);

        let mut empty = Playlist::default();
        empty.reverse();
        assert!(empty.is_empty());
        assert!(empty.check_links());
    }

    #[test]
    fn test_iter_rev_and_restart() {
        let playlist = sample(&["A", "B", "C"]);
        let back: Vec<String> = playlist.iter_rev().map(|s| s.borrow().title.clone()).collect();
        assert_eq!(back, vec!["C", "B", "A"]);
        assert_eq!(playlist.iter().len(), 3);
        // restartable
        assert_eq!(titles(&playlist), titles(&playlist));
    }

    #[test]
    fn test_pin_and_total_duration() {
        let mut playlist = Playlist::new("Test");
        playlist.add_song("A", "X", "1:30").unwrap();
        playlist.add_song("B", "Y", "0:45").unwrap();

        let pinned = playlist.set_pinned(1, true).unwrap();
        assert!(pinned.borrow().pinned);
        assert!(playlist.get(1).unwrap().borrow().pinned);
        assert!(playlist.set_pinned(5, true).is_err());
        assert_eq!(playlist.total_duration(), 135);
    }
}
