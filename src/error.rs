//! Error types shared by the organizer, the download collaborators and the CLI.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("library root {path} is unavailable: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid link: {0:?}")]
    InvalidLink(String),

    #[error("downloader `{program}` failed: {reason}")]
    Download { program: String, reason: String },

    #[error("cannot read track list {path}: {reason}")]
    SavedList { path: PathBuf, reason: String },

    #[error("failed to read the link from stdin: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to render configuration: {0}")]
    RenderConfig(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures confined to a single input file. The organizer reports these
/// and moves on to the next file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("source file {0} does not exist")]
    MissingSource(PathBuf),

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move to {destination}: {source}")]
    Move {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot remove duplicate: {0}")]
    RemoveDuplicate(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
