//! Sorting directly on the linked structure.
//!
//! The two algorithms differ in what they move:
//!
//! - **Merge sort** relinks nodes. Every `SongRef` handed out before the sort
//!   still describes the same song afterwards, it just sits somewhere else.
//! - **Quick sort** swaps title/artist/duration between nodes and never
//!   touches a link. A `SongRef` held by the rating index or the history may
//!   report a different song once it finishes. `id` and `pinned` stay with
//!   the node.
//!
//! Merge sort only trusts `next` while running. Either way `prev`, `tail` and
//! `len` are rebuilt in one forward pass afterwards.

use super::song::{swap_payload, SongRef};
use super::{NodeId, Playlist};
use crate::error::{PlayWiseError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAlgorithm {
    Merge,
    Quick,
}

impl FromStr for SortKey {
    type Err = PlayWiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "duration" => Ok(SortKey::Duration),
            _ => Err(PlayWiseError::UnknownSortKey(s.to_string())),
        }
    }
}

impl FromStr for SortAlgorithm {
    type Err = PlayWiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "merge" => Ok(SortAlgorithm::Merge),
            "quick" => Ok(SortAlgorithm::Quick),
            _ => Err(PlayWiseError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Title => "title",
            SortKey::Duration => "duration",
        })
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortAlgorithm::Merge => "merge",
            SortAlgorithm::Quick => "quick",
        })
    }
}

/// Non-strict ordering: true when `a` may sit at or before `b`
pub fn at_or_before(a: &SongRef, b: &SongRef, key: SortKey) -> bool {
    let (a, b) = (a.borrow(), b.borrow());
    match key {
        SortKey::Duration => a.duration_secs <= b.duration_secs,
        SortKey::Title => a.title.to_lowercase() <= b.title.to_lowercase(),
    }
}

pub fn sort_playlist(playlist: &mut Playlist, key: SortKey, algorithm: SortAlgorithm) {
    debug!("Sorting '{}' ({} songs) by {} using {} sort", playlist.name, playlist.len, key, algorithm);

    match algorithm {
        SortAlgorithm::Merge => {
            let head = playlist.head;
            playlist.head = merge_sort(playlist, head, key);
        }
        SortAlgorithm::Quick => quick_sort(playlist, key),
    }

    playlist.rebuild_back_links();
    info!("Sorted '{}' by {} using {} sort", playlist.name, key, algorithm);
}

/// Same as [`sort_playlist`] but takes the names a user would type
pub fn sort_by_name(playlist: &mut Playlist, key: &str, algorithm: &str) -> Result<()> {
    let algorithm: SortAlgorithm = algorithm.parse()?;
    let key: SortKey = key.parse()?;
    sort_playlist(playlist, key, algorithm);
    Ok(())
}

// ---- merge sort ----

fn merge_sort(playlist: &mut Playlist, head: Option<NodeId>, key: SortKey) -> Option<NodeId> {
    let first = head?;
    if playlist.node(first).next.is_none() {
        return head;
    }

    let middle = split(playlist, first);
    let left = merge_sort(playlist, Some(first), key);
    let right = merge_sort(playlist, middle, key);
    merge(playlist, left, right, key)
}

/// Cut the chain after its midpoint (slow/fast pointers) and return the
/// head of the second half
fn split(playlist: &mut Playlist, head: NodeId) -> Option<NodeId> {
    let mut slow = head;
    let mut fast = head;

    while let Some(ahead) = playlist.node(fast).next.and_then(|n| playlist.node(n).next) {
        fast = ahead;
        if let Some(n) = playlist.node(slow).next {
            slow = n;
        }
    }

    let middle = playlist.node(slow).next;
    playlist.node_mut(slow).next = None;
    if let Some(m) = middle {
        playlist.node_mut(m).prev = None;
    }
    middle
}

fn merge(
    playlist: &mut Playlist,
    mut left: Option<NodeId>,
    mut right: Option<NodeId>,
    key: SortKey,
) -> Option<NodeId> {
    let mut head = None;
    let mut tail: Option<NodeId> = None;

    loop {
        let picked = match (left, right) {
            (Some(l), Some(r)) => {
                // ties go left, which keeps the sort stable
                if at_or_before(&playlist.node(l).song, &playlist.node(r).song, key) {
                    left = playlist.node(l).next;
                    l
                } else {
                    right = playlist.node(r).next;
                    r
                }
            }
            (Some(rest), None) | (None, Some(rest)) => {
                append(playlist, &mut head, &mut tail, rest);
                break;
            }
            (None, None) => break,
        };
        append(playlist, &mut head, &mut tail, picked);
    }

    head
}

fn append(playlist: &mut Playlist, head: &mut Option<NodeId>, tail: &mut Option<NodeId>, id: NodeId) {
    playlist.node_mut(id).prev = *tail;
    match *tail {
        Some(t) => playlist.node_mut(t).next = Some(id),
        None => *head = Some(id),
    }
    *tail = Some(id);
}

// ---- quick sort ----

fn quick_sort(playlist: &Playlist, key: SortKey) {
    if let (Some(head), Some(tail)) = (playlist.head, playlist.tail) {
        quick_sort_range(playlist, head, tail, playlist.len, key);
    }
}

/// Sort the `len` nodes from `start` to `end` inclusive. Recurses into the
/// shorter side and loops on the longer one so the stack stays O(log n)
/// even on already-sorted input.
fn quick_sort_range(playlist: &Playlist, mut start: NodeId, mut end: NodeId, mut len: usize, key: SortKey) {
    while len > 1 {
        let (pivot, left_len) = partition(playlist, start, end, key);
        let right_len = len - left_len - 1;
        let pivot_node = playlist.node(pivot);

        if left_len < right_len {
            if left_len > 1 {
                if let Some(left_end) = pivot_node.prev {
                    quick_sort_range(playlist, start, left_end, left_len, key);
                }
            }
            match pivot_node.next {
                Some(next) => start = next,
                None => return,
            }
            len = right_len;
        } else {
            if right_len > 1 {
                if let Some(right_start) = pivot_node.next {
                    quick_sort_range(playlist, right_start, end, right_len, key);
                }
            }
            match pivot_node.prev {
                Some(prev) => end = prev,
                None => return,
            }
            len = left_len;
        }
    }
}

/// Lomuto partition with `end` as the pivot. Returns the node that now holds
/// the pivot's payload and how many nodes sit before it in the range.
fn partition(playlist: &Playlist, start: NodeId, end: NodeId, key: SortKey) -> (NodeId, usize) {
    let pivot_song = &playlist.node(end).song;
    let mut boundary: Option<NodeId> = None;
    let mut smaller = 0;
    let mut j = start;

    while j != end {
        if at_or_before(&playlist.node(j).song, pivot_song, key) {
            let slot = match boundary {
                Some(b) => next_in_range(playlist, b),
                None => start,
            };
            swap_payload(&playlist.node(slot).song, &playlist.node(j).song);
            boundary = Some(slot);
            smaller += 1;
        }
        j = next_in_range(playlist, j);
    }

    let pivot = match boundary {
        Some(b) => next_in_range(playlist, b),
        None => start,
    };
    swap_payload(&playlist.node(pivot).song, pivot_song);
    (pivot, smaller)
}

fn next_in_range(playlist: &Playlist, id: NodeId) -> NodeId {
    playlist.node(id).next.expect("range end is reachable from every node before it")
}
