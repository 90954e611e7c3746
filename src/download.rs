//! Collaborators that put new files into the staging directory: link parsing
//! and the external downloader.

mod command;
mod link;
mod saved;

pub use command::{CommandDownloader, Downloader};
pub use link::{LinkKind, SpotifyLink};
pub use saved::{SavedList, SavedTrack};
