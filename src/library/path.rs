//! Canonical `Artist/Album/NN - Title.ext` locations and the keys used to
//! detect that a track is already in the library.

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use super::model::{TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use super::normalize::{MAX_NAME_BYTES, PathNormalizer, fit_name};
use crate::config::DuplicateKeyPolicy;

/// Where a track belongs, relative to the library root. Every field has
/// already been through the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    pub artist: String,
    pub album: String,
    pub track_number: Option<u32>,
    pub title: String,
    pub extension: String,
}

impl CanonicalPath {
    pub fn from_metadata(meta: &TrackMetadata, normalizer: &PathNormalizer) -> Self {
        let segment = |value: &str, sentinel: &str| {
            let n = normalizer.normalize(value);
            if n.is_empty() { sentinel.to_string() } else { n }
        };

        let mut path = Self {
            artist: segment(&meta.artist, UNKNOWN_ARTIST),
            album: segment(&meta.album, UNKNOWN_ALBUM),
            track_number: meta.track_number,
            title: segment(&meta.title, UNKNOWN_TITLE),
            extension: normalizer.normalize(&meta.file_extension),
        };

        // The whole file name, prefix and extension included, must fit.
        let reserved = path.file_name().len() - path.title.len();
        path.title = fit_name(&path.title, MAX_NAME_BYTES.saturating_sub(reserved));
        if path.title.is_empty() {
            path.title = UNKNOWN_TITLE.to_string();
        }
        path
    }

    /// `NN - Title.ext`, or `Title.ext` when the track number is unknown.
    pub fn file_name(&self) -> String {
        let stem = match self.track_number {
            Some(n) => format!("{n:02} - {}", self.title),
            None => self.title.clone(),
        };
        if self.extension.is_empty() {
            stem
        } else {
            format!("{stem}.{}", self.extension)
        }
    }

    pub fn relative(&self) -> PathBuf {
        PathBuf::from(&self.artist)
            .join(&self.album)
            .join(self.file_name())
    }

    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.relative())
    }

    pub fn key(&self, policy: DuplicateKeyPolicy) -> DuplicateKey {
        let title = || TrackSlot::Title(fold(&self.title));
        match policy {
            DuplicateKeyPolicy::TrackNumber => DuplicateKey {
                artist: fold(&self.artist),
                album: fold(&self.album),
                slot: self.track_number.map(TrackSlot::Number).unwrap_or_else(title),
            },
            DuplicateKeyPolicy::AlbumTitle => DuplicateKey {
                artist: fold(&self.artist),
                album: fold(&self.album),
                slot: title(),
            },
            DuplicateKeyPolicy::Title => DuplicateKey {
                artist: String::new(),
                album: String::new(),
                slot: title(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackSlot {
    Number(u32),
    Title(String),
}

/// Identity of a track for duplicate detection. Components are folded so that
/// case and Unicode compatibility forms do not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    artist: String,
    album: String,
    slot: TrackSlot,
}

/// NFKC, lowercase, trimmed.
pub fn fold(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase().trim().to_string()
}
