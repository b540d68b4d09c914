//! Rating index - an unbalanced binary search tree keyed by star rating.
//!
//! Each node is a bucket holding every song rated with that value, in the
//! order they were rated. Ratings only span 1..=5, so the tree is at most
//! five levels deep whatever the insertion order and is never rebalanced.
//!
//! Removing songs never removes nodes. A bucket that empties stays in the
//! tree until [`RatingIndex::compact`] is called.

use crate::error::{PlayWiseError, Result};
use crate::index::title::normalize_title;
use crate::playlist::{Song, SongId, SongRef};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

/// Star rating, 1 to 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PlayWiseError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = PlayWiseError;

    fn try_from(value: u8) -> Result<Self> {
        Rating::new(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How to pick songs out of the buckets
#[derive(Debug, Clone, Copy)]
pub enum SongKey<'a> {
    Id(SongId),
    /// Compared after normalization, same as the title index
    Title(&'a str),
}

impl SongKey<'_> {
    fn matches(&self, song: &Song) -> bool {
        match self {
            SongKey::Id(id) => song.id == *id,
            SongKey::Title(title) => normalize_title(&song.title) == normalize_title(title),
        }
    }
}

#[derive(Debug)]
struct RatingNode {
    rating: Rating,
    songs: Vec<SongRef>,
    left: Option<Box<RatingNode>>,
    right: Option<Box<RatingNode>>,
}

impl RatingNode {
    fn new(rating: Rating, song: SongRef) -> Self {
        Self {
            rating,
            songs: vec![song],
            left: None,
            right: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RatingIndex {
    root: Option<Box<RatingNode>>,
}

impl RatingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, song: SongRef, rating: Rating) {
        info!("Rated '{}' {} stars", song.borrow().title, rating);
        insert_into(&mut self.root, song, rating);
    }

    /// Songs with exactly this rating, in the order they were rated
    pub fn search_by_rating(&self, rating: Rating) -> &[SongRef] {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match rating.cmp(&node.rating) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return &node.songs,
            };
        }
        debug!("No songs found with rating {}", rating);
        &[]
    }

    /// Strip every song matching `key` from every bucket. Emptied nodes stay.
    /// Returns how many entries were removed.
    pub fn delete_song_by_key(&mut self, key: SongKey<'_>) -> usize {
        let removed = remove_matching(&mut self.root, &key);
        debug!("Removed {} rating entries for {:?}", removed, key);
        removed
    }

    /// Buckets in ascending rating order, including empty ones
    pub fn inorder(&self) -> InOrder<'_> {
        InOrder {
            stack: Vec::new(),
            cursor: self.root.as_deref(),
        }
    }

    /// Drop nodes whose bucket is empty. Returns the number of nodes removed.
    pub fn compact(&mut self) -> usize {
        let removed = compact_node(&mut self.root);
        if removed > 0 {
            info!("Compacted rating index, removed {} empty buckets", removed);
        }
        removed
    }

    pub fn node_count(&self) -> usize {
        self.inorder().count()
    }

    /// Total rated entries across all buckets
    pub fn song_count(&self) -> usize {
        self.inorder().map(|(_, songs)| songs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

fn insert_into(slot: &mut Option<Box<RatingNode>>, song: SongRef, rating: Rating) {
    match slot {
        None => *slot = Some(Box::new(RatingNode::new(rating, song))),
        Some(node) => match rating.cmp(&node.rating) {
            Ordering::Less => insert_into(&mut node.left, song, rating),
            Ordering::Greater => insert_into(&mut node.right, song, rating),
            Ordering::Equal => node.songs.push(song),
        },
    }
}

fn remove_matching(slot: &mut Option<Box<RatingNode>>, key: &SongKey<'_>) -> usize {
    let Some(node) = slot else { return 0 };

    let before = node.songs.len();
    node.songs.retain(|song| !key.matches(&song.borrow()));
    let here = before - node.songs.len();

    here + remove_matching(&mut node.left, key) + remove_matching(&mut node.right, key)
}

fn compact_node(slot: &mut Option<Box<RatingNode>>) -> usize {
    let Some(mut node) = slot.take() else { return 0 };

    let mut removed = compact_node(&mut node.left) + compact_node(&mut node.right);
    *slot = if node.songs.is_empty() {
        removed += 1;
        splice_out(node)
    } else {
        Some(node)
    };
    removed
}

/// Standard BST removal of `node`; returns the subtree that replaces it
fn splice_out(mut node: Box<RatingNode>) -> Option<Box<RatingNode>> {
    match (node.left.take(), node.right.take()) {
        (None, None) => None,
        (Some(child), None) | (None, Some(child)) => Some(child),
        (Some(left), Some(right)) => {
            let (mut successor, rest) = take_min(right);
            successor.left = Some(left);
            successor.right = rest;
            Some(successor)
        }
    }
}

/// Detach the smallest node of a subtree; returns it and what is left
fn take_min(mut node: Box<RatingNode>) -> (Box<RatingNode>, Option<Box<RatingNode>>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (node, rest)
        }
        Some(left) => {
            let (min, rest) = take_min(left);
            node.left = rest;
            (min, Some(node))
        }
    }
}

/// Ascending walk over the buckets, driven by an explicit stack
pub struct InOrder<'a> {
    stack: Vec<&'a RatingNode>,
    cursor: Option<&'a RatingNode>,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = (Rating, &'a [SongRef]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.cursor {
            self.stack.push(node);
            self.cursor = node.left.as_deref();
        }
        let node = self.stack.pop()?;
        self.cursor = node.right.as_deref();
        Some((node.rating, node.songs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(index: &mut RatingIndex, title: &str, stars: u8) -> SongRef {
        let song = Song::new(title, "Artist", 180).into_ref();
        index.insert(song.clone(), Rating::new(stars).unwrap());
        song
    }

    fn layout(index: &RatingIndex) -> Vec<(u8, Vec<String>)> {
        index
            .inorder()
            .map(|(rating, songs)| {
                (rating.value(), songs.iter().map(|s| s.borrow().title.clone()).collect())
            })
            .collect()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert!(matches!(Rating::new(0), Err(PlayWiseError::InvalidRating(0))));
        assert!(matches!(Rating::try_from(6), Err(PlayWiseError::InvalidRating(6))));
    }

    #[test]
    fn test_inorder_groups_buckets() {
        let mut index = RatingIndex::new();
        for (title, stars) in [("a", 3), ("b", 1), ("c", 5), ("d", 3), ("e", 1)] {
            rate(&mut index, title, stars);
        }

        assert_eq!(
            layout(&index),
            vec![
                (1, vec!["b".to_string(), "e".to_string()]),
                (3, vec!["a".to_string(), "d".to_string()]),
                (5, vec!["c".to_string()]),
            ]
        );
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.song_count(), 5);
    }

    #[test]
    fn test_degenerate_chain() {
        let mut index = RatingIndex::new();
        for stars in 1..=5 {
            rate(&mut index, &format!("s{}", stars), stars);
        }
        let ratings: Vec<u8> = index.inorder().map(|(r, _)| r.value()).collect();
        assert_eq!(ratings, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_search_by_rating() {
        let mut index = RatingIndex::new();
        let first = rate(&mut index, "Believer", 4);
        rate(&mut index, "Closer", 2);
        rate(&mut index, "Bad Guy", 4);

        let fours = index.search_by_rating(Rating::new(4).unwrap());
        assert_eq!(fours.len(), 2);
        assert!(std::rc::Rc::ptr_eq(&fours[0], &first));
        assert_eq!(fours[1].borrow().title, "Bad Guy");

        assert!(index.search_by_rating(Rating::new(5).unwrap()).is_empty());
        assert!(RatingIndex::new().search_by_rating(Rating::new(1).unwrap()).is_empty());
    }

    #[test]
    fn test_delete_by_title_leaves_empty_nodes() {
        let mut index = RatingIndex::new();
        rate(&mut index, "Closer", 2);
        rate(&mut index, "Believer", 4);
        rate(&mut index, "closer ", 5);

        assert_eq!(index.delete_song_by_key(SongKey::Title("CLOSER")), 2);
        assert_eq!(index.node_count(), 3);
        assert_eq!(
            layout(&index),
            vec![(2, vec![]), (4, vec!["Believer".to_string()]), (5, vec![])]
        );
        assert_eq!(index.delete_song_by_key(SongKey::Title("Nope")), 0);
    }

    #[test]
    fn test_delete_by_id_only_hits_that_song() {
        let mut index = RatingIndex::new();
        let one = rate(&mut index, "Same", 3);
        let two = rate(&mut index, "Same", 3);

        let id = one.borrow().id;
        assert_eq!(index.delete_song_by_key(SongKey::Id(id)), 1);

        let left = index.search_by_rating(Rating::new(3).unwrap());
        assert_eq!(left.len(), 1);
        assert!(std::rc::Rc::ptr_eq(&left[0], &two));
    }

    #[test]
    fn test_compact_removes_empty_buckets() {
        let mut index = RatingIndex::new();
        // root 3 with children on both sides so the successor path runs
        rate(&mut index, "mid", 3);
        rate(&mut index, "low", 1);
        rate(&mut index, "high", 5);
        rate(&mut index, "two", 2);
        rate(&mut index, "four", 4);

        index.delete_song_by_key(SongKey::Title("mid"));
        index.delete_song_by_key(SongKey::Title("low"));
        assert_eq!(index.node_count(), 5);

        assert_eq!(index.compact(), 2);
        assert_eq!(
            layout(&index),
            vec![
                (2, vec!["two".to_string()]),
                (4, vec!["four".to_string()]),
                (5, vec!["high".to_string()]),
            ]
        );

        // inserting into a compacted tree still lands in the right bucket
        rate(&mut index, "again", 3);
        let ratings: Vec<u8> = index.inorder().map(|(r, _)| r.value()).collect();
        assert_eq!(ratings, vec![2, 3, 4, 5]);

        assert_eq!(index.compact(), 0);
    }

    #[test]
    fn test_compact_everything() {
        let mut index = RatingIndex::new();
        rate(&mut index, "x", 2);
        rate(&mut index, "x", 4);
        index.delete_song_by_key(SongKey::Title("x"));
        assert_eq!(index.compact(), 2);
        assert!(index.is_empty());
    }

    #[test]
    fn test_buckets_observe_live_fields() {
        let mut index = RatingIndex::new();
        let song = rate(&mut index, "Old Title", 5);
        song.borrow_mut().title = "New Title".to_string();
        assert_eq!(
            index.search_by_rating(Rating::new(5).unwrap())[0].borrow().title,
            "New Title"
        );
    }
}
