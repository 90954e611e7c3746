//! The organized music library: metadata, safe path segments, the index of
//! tracks already present and the organizer that files new tracks into it.
//!
//! Layout: `<root>/<Artist>/<Album>/<NN - Title>.<ext>`.

pub mod index;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod organize;
pub mod path;
mod scan;

pub use index::LibraryIndex;
pub use organize::{OrganizeOptions, OrganizeResult, Organizer, RunSummary};
pub use scan::scan;

#[cfg(test)]
mod tests;
