// Auxiliary indexes over playlist songs
// Neither one owns songs or follows the playlist on its own - callers keep them in sync

pub mod rating; // BST of rating buckets
pub mod title;  // case-insensitive title lookup

pub use rating::{InOrder, Rating, RatingIndex, SongKey};
pub use title::{normalize_title, TitleIndex};
