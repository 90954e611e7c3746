use std::path::Path;

use lofty::prelude::{Accessor, TaggedFileExt};
use tracing::warn;

use super::model::{Metadata, TrackMetadata};

/// Source of per-file metadata for the indexer and organizer.
pub trait ReadMetadata {
    /// Never fails: unreadable files yield `FilenameInferred` or `Unknown`.
    fn read(&self, path: &Path) -> Metadata;
}

/// Reads embedded tags with lofty, falling back to the file name.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagReader;

struct TagFields {
    artist: Option<String>,
    album: Option<String>,
    title: Option<String>,
    track_number: Option<u32>,
}

impl ReadMetadata for TagReader {
    fn read(&self, path: &Path) -> Metadata {
        let tags = match read_tags(path) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable tags, using file name");
                None
            }
        };

        let inferred = infer_from_path(path);
        let Some(tags) = tags else {
            return inferred;
        };

        // Tags may be partial; fill the gaps from whatever the file name gave us.
        let fallback = inferred.track();
        let fallback_artist = match &inferred {
            Metadata::FilenameInferred(t) if t.track_number.is_none() => Some(t.artist.as_str()),
            _ => None,
        };

        Metadata::Tagged(TrackMetadata::new(
            tags.artist.as_deref().or(fallback_artist),
            tags.album.as_deref(),
            tags.track_number.or(fallback.track_number),
            tags.title.as_deref().or(Some(fallback.title.as_str())),
            &fallback.file_extension,
        ))
    }
}

fn read_tags(path: &Path) -> Result<Option<TagFields>, lofty::error::LoftyError> {
    let tagged = lofty::read_from_path(path)?;
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(None);
    };

    let non_blank = |v: Option<std::borrow::Cow<'_, str>>| {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    };

    let fields = TagFields {
        artist: non_blank(tag.artist()),
        album: non_blank(tag.album()),
        title: non_blank(tag.title()),
        track_number: tag.track(),
    };

    if fields.artist.is_none() && fields.album.is_none() && fields.title.is_none() {
        return Ok(None);
    }
    Ok(Some(fields))
}

/// Metadata from the file name alone.
///
/// Recognised stems:
/// - `NN - Title` (one to three digits): track number and title
/// - `Artist - Title`: artist and title
///
/// Album is always unknown here.
pub fn infer_from_path(path: &Path) -> Metadata {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .trim();
    let ext = extension_of(path);

    match parse_stem(stem) {
        StemPattern::Numbered(n, title) => {
            Metadata::FilenameInferred(TrackMetadata::new(None, None, Some(n), Some(title), &ext))
        }
        StemPattern::ArtistTitle(artist, title) => Metadata::FilenameInferred(TrackMetadata::new(
            Some(artist),
            None,
            None,
            Some(title),
            &ext,
        )),
        StemPattern::Plain(title) => {
            Metadata::Unknown(TrackMetadata::new(None, None, None, Some(title), &ext))
        }
    }
}

pub(crate) enum StemPattern<'a> {
    Numbered(u32, &'a str),
    ArtistTitle(&'a str, &'a str),
    Plain(&'a str),
}

pub(crate) fn parse_stem(stem: &str) -> StemPattern<'_> {
    let Some((left, right)) = stem.split_once(" - ") else {
        return StemPattern::Plain(stem);
    };
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return StemPattern::Plain(stem);
    }

    if left.len() <= 3 && left.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = left.parse::<u32>() {
            return StemPattern::Numbered(n, right);
        }
    }
    StemPattern::ArtistTitle(left, right)
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
