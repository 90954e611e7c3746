use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::metadata::{ReadMetadata, StemPattern, extension_of, parse_stem};
use super::model::TrackMetadata;
use super::normalize::PathNormalizer;
use super::path::{CanonicalPath, DuplicateKey};
use super::scan::scan_all;
use crate::config::{DuplicateKeyPolicy, LibrarySettings};

/// Minimum walk depth of a file that sits inside `Artist/Album/`.
const LAYOUT_DEPTH: usize = 3;

/// Tracks already present in the library, keyed by [`DuplicateKey`].
///
/// Built once per run and only mutated by the organizer as it moves files in.
#[derive(Debug)]
pub struct LibraryIndex {
    policy: DuplicateKeyPolicy,
    entries: HashMap<DuplicateKey, PathBuf>,
    skipped: Vec<PathBuf>,
}

impl LibraryIndex {
    pub fn new(policy: DuplicateKeyPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Walk `root` and index every audio file inside the `Artist/Album/` layout.
    ///
    /// A missing or empty root yields an empty index. Files that cannot be placed
    /// are recorded in [`skipped`](Self::skipped) and otherwise ignored.
    pub fn build<R: ReadMetadata>(
        root: &Path,
        policy: DuplicateKeyPolicy,
        settings: &LibrarySettings,
        reader: &R,
        normalizer: &PathNormalizer,
    ) -> Self {
        let mut index = Self::new(policy);

        let outcome = scan_all(root, settings);
        index.skipped.extend(outcome.unreadable);

        for file in outcome.files {
            let canonical = match classify(&file.path, file.depth, reader) {
                Some(meta) => CanonicalPath::from_metadata(&meta, normalizer),
                None => {
                    warn!(path = %file.path.display(), "outside the Artist/Album layout, not indexed");
                    index.skipped.push(file.path);
                    continue;
                }
            };

            let key = canonical.key(policy);
            if let Some(existing) = index.entries.get(&key) {
                warn!(
                    path = %file.path.display(),
                    existing = %existing.display(),
                    "library already holds this track twice"
                );
                continue;
            }
            debug!(path = %file.path.display(), "indexed");
            index.entries.insert(key, file.path);
        }

        info!(
            root = %root.display(),
            tracks = index.len(),
            skipped = index.skipped.len(),
            "library indexed"
        );
        index
    }

    pub fn policy(&self) -> DuplicateKeyPolicy {
        self.policy
    }

    /// Library file already holding `key`, if any.
    pub fn get(&self, key: &DuplicateKey) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    /// Record `path` as the holder of `key`. The first holder wins; returns
    /// `false` when the key was already present.
    pub fn insert(&mut self, key: DuplicateKey, path: PathBuf) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, path);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files found under the root that could not be classified, and entries
    /// the walk could not read.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}

/// Tags when present, otherwise `Artist/Album/NN - Title.ext` read back from the path.
pub(crate) fn classify<R: ReadMetadata>(path: &Path, depth: usize, reader: &R) -> Option<TrackMetadata> {
    if depth < LAYOUT_DEPTH {
        return None;
    }

    let meta = reader.read(path);
    if meta.is_tagged() {
        return Some(meta.into_track());
    }

    let album_dir = path.parent()?;
    let album = album_dir.file_name()?.to_str()?;
    let artist = album_dir.parent()?.file_name()?.to_str()?;
    let stem = path.file_stem()?.to_str()?.trim();

    let (track_number, title) = match parse_stem(stem) {
        StemPattern::Numbered(n, title) => (Some(n), title),
        StemPattern::ArtistTitle(..) | StemPattern::Plain(_) => (None, stem),
    };

    Some(TrackMetadata::new(
        Some(artist),
        Some(album),
        track_number,
        Some(title),
        &extension_of(path),
    ))
}
