// PlayWise Library - playlist engine plus the indexes that hang off it
// Songs are shared by reference: the playlist owns the order, everything else points in

pub mod config;   // settings and preferences
pub mod error;    // typed failures for every core operation
pub mod export;   // text reports
pub mod history;  // playback history stack
pub mod index;    // title lookup + rating tree
pub mod playlist; // linked list, sorting, shuffle
pub mod shell;    // line-oriented command loop

// Export the stuff other modules actually use
pub use config::Config;
pub use error::{PlayWiseError, Result};
pub use export::ExportManager;
pub use history::PlaybackHistory;
pub use index::{Rating, RatingIndex, SongKey, TitleIndex};
pub use playlist::{
    shuffle_unpinned, sort_by_name, sort_playlist, Playlist, Song, SongId, SongRef, SortAlgorithm, SortKey,
};
pub use shell::{run_shell, Command, Session};
