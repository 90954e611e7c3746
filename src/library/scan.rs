use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// An audio file found under a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Directory depth below the scan root; files directly in the root are 1.
    pub depth: usize,
}

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Result of walking a directory.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<ScannedFile>,
    /// Entries the walk could not read (permissions, link loops).
    pub unreadable: Vec<PathBuf>,
}

/// List audio files under `dir`, sorted by path. A missing `dir` yields nothing.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<ScannedFile> {
    scan_all(dir, settings).files
}

/// Like [`scan`], also returning the entries that could not be read.
pub fn scan_all(dir: &Path, settings: &LibrarySettings) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let missing_root = e.depth() == 0
                    && e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound);
                if !missing_root {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    warn!(path = %path.display(), error = %e, "cannot read, skipped");
                    outcome.unreadable.push(path);
                }
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            outcome.files.push(ScannedFile {
                path: path.to_path_buf(),
                depth: entry.depth(),
            });
        }
    }

    outcome.files.sort_by(|a, b| a.path.cmp(&b.path));
    outcome
}
