use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spotshelf/config.toml` or `~/.config/spotshelf/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `SPOTSHELF__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub organize: OrganizeSettings,
    pub download: DownloadSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Root of the organized `Artist/Album/Track` tree.
    pub root: PathBuf,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// File each synced playlist or album under `<root>/<list name>/`.
    pub per_list_folders: bool,
    /// Folder for single-track links when `per_list_folders` is on.
    pub singles_folder: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Music"),
            extensions: ["mp3", "wav", "m4a", "flac", "opus", "ogg"]
                .into_iter()
                .map(String::from)
                .collect(),
            follow_links: false,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            per_list_folders: false,
            singles_folder: "Singles".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrganizeSettings {
    /// Which fields decide that an incoming track is already in the library.
    pub duplicate_key: DuplicateKeyPolicy,
    /// Delete the incoming file when it turns out to be a duplicate.
    pub delete_duplicates: bool,
    /// Character substituted for characters that are unsafe in file names.
    pub replacement: char,
}

impl Default for OrganizeSettings {
    fn default() -> Self {
        Self {
            duplicate_key: DuplicateKeyPolicy::TrackNumber,
            delete_duplicates: false,
            replacement: '_',
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeyPolicy {
    /// (artist, album, track number), or (artist, album, title) when the number is unknown.
    #[serde(alias = "track_number", alias = "number")]
    TrackNumber,
    /// (artist, album, title).
    #[serde(alias = "album_title")]
    AlbumTitle,
    /// Title alone, across the whole library.
    Title,
}

/// Spelled the way the CLI and config files spell it (`track-number`).
impl fmt::Display for DuplicateKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use clap::ValueEnum;
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => fmt::Debug::fmt(self, f),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Downloader executable.
    pub program: String,
    /// Arguments that fetch one track. `{url}` (the track's URL, or an
    /// `artist title` search when it has none) and `{staging}` are substituted.
    pub args: Vec<String>,
    /// Arguments that write the link's track list as JSON. `{url}` and
    /// `{save_file}` are substituted.
    pub save_args: Vec<String>,
    /// Only download tracks the library does not hold yet.
    pub skip_existing: bool,
    /// Where the downloader writes files. Defaults to `<library.root>/.incoming`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            program: "spotdl".to_string(),
            args: vec![
                "download".to_string(),
                "{url}".to_string(),
                "--output".to_string(),
                "{staging}/{artist} - {title}.{output-ext}".to_string(),
            ],
            save_args: vec![
                "save".to_string(),
                "{url}".to_string(),
                "--save-file".to_string(),
                "{save_file}".to_string(),
            ],
            skip_existing: true,
            staging_dir: None,
        }
    }
}
