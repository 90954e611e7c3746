use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::library::model::TrackMetadata;

/// One entry of the JSON list the downloader saves for a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SavedTrack {
    pub name: Option<String>,
    pub artists: Vec<String>,
    pub album_name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub track_number: Option<u32>,
    pub url: Option<String>,
    /// Playlist or album name; absent for single-track links.
    pub list_name: Option<String>,
}

impl SavedTrack {
    /// The first listed artist is the track's artist.
    pub fn metadata(&self) -> TrackMetadata {
        TrackMetadata::new(
            self.artists.first().map(String::as_str),
            self.album_name.as_deref(),
            self.track_number,
            self.name.as_deref(),
            "",
        )
    }

    /// What to hand the downloader: the track URL, else an `artist title` search.
    pub fn download_target(&self) -> String {
        if let Some(url) = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        let meta = self.metadata();
        format!("{} {}", meta.artist, meta.title)
    }
}

/// Tracks behind a playlist, album or track link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedList {
    pub tracks: Vec<SavedTrack>,
}

impl SavedList {
    pub fn load(path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::SavedList {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        Self::from_json(&text).map_err(|e| invalid(e.to_string()))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let tracks = serde_json::from_str(text)?;
        Ok(Self { tracks })
    }

    /// Name of the playlist or album; `None` for a single track.
    pub fn name(&self) -> Option<&str> {
        self.tracks
            .first()
            .and_then(|t| t.list_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Track numbers show up as numbers, strings or null.
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u32>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
