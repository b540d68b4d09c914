// Shuffle that keeps pinned songs where they are
// Unpinned songs trade payloads; nodes and links never move.

use super::song::SongRef;
use super::Playlist;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Shuffle every unpinned song among the unpinned positions.
///
/// Pinned songs keep their position and fields. Payloads are snapshotted
/// before anything is written back, so each unpinned song lands exactly once.
/// Returns how many songs took part; fewer than two unpinned songs is a no-op.
pub fn shuffle_unpinned<R: Rng + ?Sized>(playlist: &mut Playlist, rng: &mut R) -> usize {
    let slots: Vec<SongRef> = playlist
        .iter()
        .filter(|song| !song.borrow().pinned)
        .cloned()
        .collect();

    if slots.len() < 2 {
        debug!("Not enough unpinned songs in '{}' to shuffle", playlist.name());
        return 0;
    }

    let mut payloads: Vec<_> = slots.iter().map(|song| song.borrow().payload()).collect();
    payloads.shuffle(rng);

    for (slot, payload) in slots.iter().zip(payloads) {
        slot.borrow_mut().set_payload(payload);
    }

    info!("Shuffled {} unpinned songs in '{}'", slots.len(), playlist.name());
    slots.len()
}
