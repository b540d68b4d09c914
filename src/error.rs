// Error types for the playlist engine and its indexes
// Everything here is recoverable - callers decide whether to retry or report

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayWiseError {
    /// Duration text was not `mm:ss`
    #[error("Invalid duration '{0}' - use mm:ss (e.g. 1:30)")]
    InvalidDuration(String),

    #[error("Index {index} is out of range for a playlist of {len} songs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Song '{0}' already exists in lookup")]
    DuplicateTitle(String),

    #[error("No song found with title '{0}'")]
    NotFound(String),

    #[error("Song title must not be empty")]
    EmptyTitle,

    #[error("Unknown sorting algorithm '{0}' (expected merge or quick)")]
    UnknownAlgorithm(String),

    #[error("Unknown sort key '{0}' (expected title or duration)")]
    UnknownSortKey(String),

    #[error("No recently played songs to undo")]
    EmptyHistory,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayWiseError>;
