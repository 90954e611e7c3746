use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DuplicateKeyPolicy;

#[derive(Debug, Parser)]
#[command(name = "spotshelf", version)]
#[command(about = "Download Spotify playlists and file them into an Artist/Album library", long_about = None)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/spotshelf/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Library root to organize into
    #[arg(short = 'r', long, global = true)]
    pub library_root: Option<PathBuf>,

    /// Which fields identify a track that is already in the library
    #[arg(long, value_enum, global = true)]
    pub duplicate_key: Option<DuplicateKeyPolicy>,

    /// Delete incoming files that are already in the library
    #[arg(long, global = true)]
    pub delete_duplicates: bool,

    /// Defaults to `sync`, prompting for a link
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a playlist, album or track and organize the result
    Sync {
        /// Spotify link; prompted for when omitted
        link: Option<String>,
    },
    /// Organize audio files that are already on disk
    Organize {
        /// Directory holding the files to organize
        dir: PathBuf,
    },
    /// Index the library and report what was found
    Index,
    /// Print the effective configuration as TOML
    Config,
}
