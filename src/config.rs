//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema that drives the library
//! root, the organizer and the downloader, and helpers to load it from disk.

mod load;
mod schema;

pub use load::*;
pub use schema::*;
