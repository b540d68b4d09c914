// Interactive shell - one command per line over a playlist session
// Keeps the playlist, both indexes and the history in step with each other

pub mod command;

pub use command::{Command, HELP};

use crate::config::Config;
use crate::error::PlayWiseError;
use crate::export::ExportManager;
use crate::history::PlaybackHistory;
use crate::index::{normalize_title, Rating, RatingIndex, SongKey, TitleIndex};
use crate::playlist::{shuffle_unpinned, sort_by_name, Playlist, SongRef};
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unknown command '{0}' - type 'help' for a list")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid number")]
    BadNumber(String),

    #[error(transparent)]
    PlayWise(#[from] PlayWiseError),
}

/// Starter playlist loaded when `load_demo_songs` is on
pub const DEMO_SONGS: [(&str, &str, &str); 10] = [
    ("Blinding Lights", "The Weeknd", "3:20"),
    ("Shape of You", "Ed Sheeran", "3:53"),
    ("Levitating", "Dua Lipa", "3:23"),
    ("Uptown Funk", "Mark Ronson ft. Bruno Mars", "4:30"),
    ("Bohemian Rhapsody", "Queen", "5:55"),
    ("Bad Guy", "Billie Eilish", "3:14"),
    ("Believer", "Imagine Dragons", "3:24"),
    ("Rolling in the Deep", "Adele", "3:48"),
    ("Can't Stop the Feeling!", "Justin Timberlake", "3:56"),
    ("Closer", "The Chainsmokers ft. Halsey", "4:05"),
];

pub struct Session {
    playlist: Playlist,
    titles: TitleIndex,
    ratings: RatingIndex,
    history: PlaybackHistory,
    exporter: ExportManager,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            playlist: Playlist::new(config.playlist_name.clone()),
            titles: TitleIndex::new(),
            ratings: RatingIndex::new(),
            history: PlaybackHistory::new(),
            exporter: ExportManager::new(config.export.directory.clone()),
            config,
        }
    }

    pub fn load_demo_songs(&mut self) -> Result<(), ShellError> {
        for (title, artist, duration) in DEMO_SONGS {
            self.add(title, artist, duration)?;
        }
        info!("Loaded {} demo songs", DEMO_SONGS.len());
        Ok(())
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn titles(&self) -> &TitleIndex {
        &self.titles
    }

    pub fn ratings(&self) -> &RatingIndex {
        &self.ratings
    }

    pub fn history(&self) -> &PlaybackHistory {
        &self.history
    }

    /// Add to the playlist and register the title. The title is checked
    /// first so a clash leaves both structures untouched.
    pub fn add(&mut self, title: &str, artist: &str, duration: &str) -> Result<SongRef, ShellError> {
        if normalize_title(title).is_empty() {
            return Err(PlayWiseError::EmptyTitle.into());
        }
        if self.titles.find(title).is_some() {
            return Err(PlayWiseError::DuplicateTitle(title.to_string()).into());
        }

        let song = self.playlist.add_song(title, artist, duration)?;
        self.titles.add(&song)?;
        Ok(song)
    }

    pub fn execute(&mut self, command: Command) -> Result<String, ShellError> {
        debug!("Executing {:?}", command);

        let output = match command {
            Command::Add { title, artist, duration } => {
                let song = self.add(&title, &artist, &duration)?;
                let song = song.borrow();
                format!(
                    "Added: {} to '{}' ({})",
                    song.display_line(),
                    self.playlist.name(),
                    song.formatted_duration()
                )
            }
            Command::Delete(n) => {
                let song = self.playlist.delete_song(zero_based(n)?)?;
                self.forget_deleted(&song);
                let line = song.borrow().display_line();
                format!("Deleted: {}", line)
            }
            Command::Move { from, to } => {
                self.playlist.move_song(zero_based(from)?, zero_based(to)?)?;
                format!("Moved song {} to position {}", from, to)
            }
            Command::Reverse => {
                self.playlist.reverse();
                "Playlist reversed".to_string()
            }
            Command::Show => self.render_playlist(),
            Command::Sort { key, algorithm } => {
                sort_by_name(&mut self.playlist, &key, &algorithm)?;
                self.titles.reindex();
                format!(
                    "Sorted by {} using {} sort\n{}",
                    key.to_lowercase(),
                    algorithm.to_lowercase(),
                    self.render_playlist()
                )
            }
            Command::Play(n) => {
                let song = self.song_at(n)?;
                let line = song.borrow().display_line();
                self.history.play(song);
                format!("Now playing: {}", line)
            }
            Command::Undo => {
                let song = self.history.undo_last_play().ok_or(PlayWiseError::EmptyHistory)?;
                let line = song.borrow().display_line();
                format!("Undo last play: {}", line)
            }
            Command::History => {
                if self.history.is_empty() {
                    "No songs played yet.".to_string()
                } else {
                    let mut out = String::from("Recently played:");
                    for (i, song) in self.history.history().enumerate() {
                        let _ = write!(out, "\n{}. {}", i + 1, song.borrow().display_line());
                    }
                    out
                }
            }
            Command::Rate { position, stars } => {
                let rating = Rating::new(stars)?;
                let song = self.song_at(position)?;
                let title = song.borrow().title.clone();
                self.ratings.insert(song, rating);
                format!("Rated '{}' {} stars", title, rating)
            }
            Command::Rated(stars) => {
                let rating = Rating::new(stars)?;
                let songs = self.ratings.search_by_rating(rating);
                if songs.is_empty() {
                    format!("No songs found with rating {}", rating)
                } else {
                    let mut out = format!("Songs with rating {}:", rating);
                    for (i, song) in songs.iter().enumerate() {
                        let _ = write!(out, "\n{}. {}", i + 1, song.borrow().display_line());
                    }
                    out
                }
            }
            Command::Ratings => self.render_ratings(),
            Command::Compact => {
                let removed = self.ratings.compact();
                format!("Removed {} empty rating buckets", removed)
            }
            Command::Find(title) => self.render_lookup(&title),
            Command::Forget(title) => {
                self.titles.remove(&title)?;
                format!("Deleted '{}' from lookup", title)
            }
            Command::Pin(n) => {
                let song = self.playlist.set_pinned(zero_based(n)?, true)?;
                let title = song.borrow().title.clone();
                format!("'{}' has been pinned at position {}", title, n)
            }
            Command::Unpin(n) => {
                let song = self.playlist.set_pinned(zero_based(n)?, false)?;
                let title = song.borrow().title.clone();
                format!("'{}' has been unpinned from position {}", title, n)
            }
            Command::Shuffle => match shuffle_unpinned(&mut self.playlist, &mut rand::thread_rng()) {
                0 => "Not enough unpinned songs to shuffle".to_string(),
                n => {
                    self.titles.reindex();
                    format!("Shuffled {} songs, pinned songs kept in place", n)
                }
            },
            Command::Dashboard(file) => {
                let file = file.unwrap_or_else(|| self.config.export.dashboard_file.clone());
                let path = self.exporter.export_dashboard(&self.playlist, &file)?;
                format!("Snapshot exported to '{}'", path.display())
            }
            Command::Summary(file) => {
                let file = file.unwrap_or_else(|| self.config.export.summary_file.clone());
                let path = self.exporter.export_summary(&self.playlist, &file)?;
                format!("Summary report written to '{}'", path.display())
            }
            Command::Help => HELP.to_string(),
            Command::Quit => "Exiting PlayWise".to_string(),
        };
        Ok(output)
    }

    fn song_at(&self, position: usize) -> Result<SongRef, ShellError> {
        let index = zero_based(position)?;
        let song = self.playlist.get(index).cloned().ok_or(PlayWiseError::IndexOutOfRange {
            index,
            len: self.playlist.len(),
        })?;
        Ok(song)
    }

    /// Drop a deleted song from the indexes, matching on the record itself
    /// rather than its title. History keeps its reference.
    fn forget_deleted(&mut self, song: &SongRef) {
        if self.titles.remove_song(song).is_none() {
            debug!("'{}' was not in lookup", song.borrow().title);
        }
        let id = song.borrow().id;
        self.ratings.delete_song_by_key(SongKey::Id(id));
    }

    fn render_playlist(&self) -> String {
        let mut out = format!("Playlist: {}\n----------------------------------------", self.playlist.name());
        for (i, song) in self.playlist.iter().enumerate() {
            let song = song.borrow();
            let pin = if song.pinned { " [pinned]" } else { "" };
            let _ = write!(out, "\n{}. {} ({}){}", i + 1, song.display_line(), song.formatted_duration(), pin);
        }
        let _ = write!(
            out,
            "\n----------------------------------------\nTotal songs: {}",
            self.playlist.len()
        );
        out
    }

    fn render_ratings(&self) -> String {
        if self.ratings.is_empty() {
            return "No rated songs yet".to_string();
        }
        let mut out = String::from("All rated songs (lowest to highest):");
        for (rating, songs) in self.ratings.inorder() {
            let _ = write!(out, "\nRating {}:", rating);
            if songs.is_empty() {
                out.push_str(" (empty)");
            }
            for song in songs {
                let _ = write!(out, "\n  - {}", song.borrow().display_line());
            }
        }
        out
    }

    fn render_lookup(&self, title: &str) -> String {
        if let Some(song) = self.titles.find(title) {
            let song = song.borrow();
            return format!(
                "Found: {}\nArtist: {}\nDuration: {}",
                song.title,
                song.artist,
                song.formatted_duration()
            );
        }

        let mut out = format!("No song found with title '{}'", title.trim());
        let suggestions = self.titles.suggest(title, self.config.lookup.suggestion_limit);
        if !suggestions.is_empty() {
            let names: Vec<String> = suggestions.iter().map(|s| s.borrow().title.clone()).collect();
            let _ = write!(out, "\nDid you mean: {}?", names.join(", "));
        }
        out
    }
}

/// 1-based position as shown to the user, to a playlist index
fn zero_based(position: usize) -> Result<usize, ShellError> {
    position
        .checked_sub(1)
        .ok_or_else(|| ShellError::BadNumber(position.to_string()))
}

/// Read commands until `quit` or end of input. Failed commands are reported
/// and the loop carries on.
pub fn run_shell<R: BufRead, W: Write>(session: &mut Session, input: R, mut output: W) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(output, "> ")?;
            output.flush()?;
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => {
                writeln!(output, "Exiting PlayWise")?;
                return Ok(());
            }
            Ok(command) => match session.execute(command) {
                Ok(text) => writeln!(output, "{}", text)?,
                Err(e) => {
                    warn!("Command '{}' failed: {}", line.trim(), e);
                    writeln!(output, "error: {}", e)?;
                }
            },
            Err(e) => writeln!(output, "error: {}", e)?,
        }

        write!(output, "> ")?;
        output.flush()?;
    }

    Ok(())
}
