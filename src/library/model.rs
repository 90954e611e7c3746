pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Everything the organizer needs to know about one audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artist: String,
    pub album: String,
    pub track_number: Option<u32>,
    pub title: String,
    /// Extension without the leading dot, as found on the source file.
    pub file_extension: String,
}

impl TrackMetadata {
    /// Build a record, substituting sentinels for blank artist, album and title.
    pub fn new(
        artist: Option<&str>,
        album: Option<&str>,
        track_number: Option<u32>,
        title: Option<&str>,
        file_extension: &str,
    ) -> Self {
        fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(sentinel)
                .to_string()
        }

        Self {
            artist: or_sentinel(artist, UNKNOWN_ARTIST),
            album: or_sentinel(album, UNKNOWN_ALBUM),
            track_number: track_number.filter(|n| *n > 0),
            title: or_sentinel(title, UNKNOWN_TITLE),
            file_extension: file_extension.to_string(),
        }
    }
}

/// Metadata tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    /// Read from embedded tags.
    Tagged(TrackMetadata),
    /// Guessed from the file name (`Artist - Title` or `NN - Title`).
    FilenameInferred(TrackMetadata),
    /// Nothing usable: sentinel artist/album, file stem as title.
    Unknown(TrackMetadata),
}

impl Metadata {
    pub fn track(&self) -> &TrackMetadata {
        match self {
            Metadata::Tagged(t) | Metadata::FilenameInferred(t) | Metadata::Unknown(t) => t,
        }
    }

    pub fn into_track(self) -> TrackMetadata {
        match self {
            Metadata::Tagged(t) | Metadata::FilenameInferred(t) | Metadata::Unknown(t) => t,
        }
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, Metadata::Tagged(_))
    }
}
