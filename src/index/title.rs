use crate::error::{PlayWiseError, Result};
use crate::playlist::SongRef;
use fuzzy_matcher::{clangd::ClangdMatcher, FuzzyMatcher};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Lookup key for a title: trimmed and lowercased
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Instant title lookup. Holds the same `SongRef`s as the playlist and is
/// only updated when the caller says so - deleting or retitling a song in
/// the playlist does not touch this map.
#[derive(Debug, Default)]
pub struct TitleIndex {
    songs: HashMap<String, SongRef>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, song: &SongRef) -> Result<()> {
        let title = song.borrow().title.clone();
        let key = normalize_title(&title);
        if key.is_empty() {
            return Err(PlayWiseError::EmptyTitle);
        }
        if self.songs.contains_key(&key) {
            warn!("Song '{}' already exists in lookup", title);
            return Err(PlayWiseError::DuplicateTitle(title));
        }

        debug!("Indexed '{}' under '{}'", title, key);
        self.songs.insert(key, song.clone());
        Ok(())
    }

    pub fn find(&self, title: &str) -> Option<SongRef> {
        self.songs.get(&normalize_title(title)).cloned()
    }

    pub fn remove(&mut self, title: &str) -> Result<SongRef> {
        self.songs
            .remove(&normalize_title(title))
            .map(|song| {
                debug!("Dropped '{}' from lookup", title.trim());
                song
            })
            .ok_or_else(|| PlayWiseError::NotFound(title.trim().to_string()))
    }

    /// Drop whichever entry holds this exact record, whatever its key.
    /// Returns the key that was removed.
    pub fn remove_song(&mut self, song: &SongRef) -> Option<String> {
        let key = self
            .songs
            .iter()
            .find(|(_, indexed)| Rc::ptr_eq(indexed, song))
            .map(|(key, _)| key.clone())?;
        self.songs.remove(&key);
        debug!("Dropped '{}' from lookup", key);
        Some(key)
    }

    /// Re-key every entry from the current title of the record it holds.
    /// Quick sort and shuffle move titles between records, which leaves the
    /// old keys pointing at the wrong songs until this runs. On a clash only
    /// one of the records keeps the key.
    pub fn reindex(&mut self) {
        let entries: Vec<SongRef> = self.songs.drain().map(|(_, song)| song).collect();
        for song in entries {
            let key = normalize_title(&song.borrow().title);
            if self.songs.contains_key(&key) {
                warn!("Two songs now share the title '{}', keeping one", key);
                continue;
            }
            self.songs.insert(key, song);
        }
        debug!("Re-indexed {} titles", self.songs.len());
    }

    /// Closest titles to `query`, best match first. Used for "did you mean"
    /// when an exact lookup misses.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<SongRef> {
        let query = normalize_title(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let matcher = ClangdMatcher::default();
        let mut scored: Vec<(i64, &String, &SongRef)> = self
            .songs
            .iter()
            .filter_map(|(key, song)| matcher.fuzzy_match(key, &query).map(|score| (score, key, song)))
            .collect();

        // highest score first, key order breaks ties so results are stable
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.into_iter().take(limit).map(|(_, _, song)| song.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
