use crate::error::{PlayWiseError, Result};
use regex::Regex;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use uuid::Uuid;

/// Stable identity assigned when a song is created. Never moves between nodes.
pub type SongId = Uuid;

/// Shared handle to a song. The playlist, both indexes and the history all
/// hold clones of the same `Rc`, so field changes are visible everywhere.
pub type SongRef = Rc<RefCell<Song>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub duration_secs: u64,
    pub pinned: bool,
}

/// The part of a song that quick sort and shuffle move between nodes.
/// `id` and `pinned` belong to the node and stay put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Payload {
    pub title: String,
    pub artist: String,
    pub duration_secs: u64,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            artist: artist.into(),
            duration_secs,
            pinned: false,
        }
    }

    pub fn into_ref(self) -> SongRef {
        Rc::new(RefCell::new(self))
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_secs)
    }

    /// "Title by Artist" - the way songs show up in listings and reports
    pub fn display_line(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }

    pub(crate) fn payload(&self) -> Payload {
        Payload {
            title: self.title.clone(),
            artist: self.artist.clone(),
            duration_secs: self.duration_secs,
        }
    }

    pub(crate) fn set_payload(&mut self, payload: Payload) {
        self.title = payload.title;
        self.artist = payload.artist;
        self.duration_secs = payload.duration_secs;
    }
}

/// Swap title/artist/duration between two nodes' songs.
/// Both sides must be distinct records - swapping a song with itself is a no-op.
pub(crate) fn swap_payload(a: &SongRef, b: &SongRef) {
    if Rc::ptr_eq(a, b) {
        return;
    }
    let mut a = a.borrow_mut();
    let mut b = b.borrow_mut();
    std::mem::swap(&mut a.title, &mut b.title);
    std::mem::swap(&mut a.artist, &mut b.artist);
    std::mem::swap(&mut a.duration_secs, &mut b.duration_secs);
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*$").expect("duration pattern is a valid regex")
    })
}

/// Parse "mm:ss" into seconds. Seconds above 59 are accepted and carried
/// into the total ("1:75" is 135 seconds).
pub fn parse_duration(text: &str) -> Result<u64> {
    let invalid = || PlayWiseError::InvalidDuration(text.to_string());

    let caps = duration_pattern().captures(text).ok_or_else(invalid)?;
    let minutes: u64 = caps[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = caps[2].parse().map_err(|_| invalid())?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Seconds back to "m:ss"
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1:30").unwrap(), 90);
        assert_eq!(parse_duration("0:45").unwrap(), 45);
        assert_eq!(parse_duration(" 3 : 05 ").unwrap(), 185);
        assert_eq!(parse_duration("1:75").unwrap(), 135);
        assert_eq!(parse_duration("0:00").unwrap(), 0);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for bad in ["", "90", "1:", ":30", "a:bc", "1:30:00", "-1:30", "1.5:00"] {
            assert!(
                matches!(parse_duration(bad), Err(PlayWiseError::InvalidDuration(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("99999999999999999999:00").is_err());
        assert!(parse_duration("307445734561825861:00").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(45), "0:45");
        assert_eq!(format_duration(355), "5:55");
        assert_eq!(format_duration(3600), "60:00");
    }

    #[test]
    fn test_swap_payload_keeps_identity() {
        let a = Song::new("A", "X", 10).into_ref();
        let b = Song::new("B", "Y", 20).into_ref();
        b.borrow_mut().pinned = true;
        let (id_a, id_b) = (a.borrow().id, b.borrow().id);

        swap_payload(&a, &b);

        assert_eq!(a.borrow().title, "B");
        assert_eq!(a.borrow().duration_secs, 20);
        assert_eq!(b.borrow().artist, "X");
        assert_eq!(a.borrow().id, id_a);
        assert_eq!(b.borrow().id, id_b);
        assert!(b.borrow().pinned);

        // same record on both sides must not double-borrow
        swap_payload(&a, &a);
        assert_eq!(a.borrow().title, "B");
    }
}
