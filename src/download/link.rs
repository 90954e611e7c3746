use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Playlist,
    Album,
    Track,
    Other,
}

impl LinkKind {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "playlist" => Some(Self::Playlist),
            "album" => Some(Self::Album),
            "track" => Some(Self::Track),
            _ => None,
        }
    }
}

/// A Spotify link with tracking parameters removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyLink {
    url: String,
    kind: LinkKind,
    id: String,
}

impl SpotifyLink {
    /// Accepts `https://open.spotify.com/<kind>/<id>?si=…` style URLs and
    /// `spotify:<kind>:<id>` URIs. Anything else is kept as-is with the last
    /// path segment as id, so the downloader can still try it.
    pub fn parse(input: &str) -> Result<Self> {
        let url = input
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        if url.is_empty() {
            return Err(Error::InvalidLink(input.to_string()));
        }

        if let Some(rest) = url.strip_prefix("spotify:") {
            let mut parts = rest.split(':');
            let kind = parts.next().and_then(LinkKind::from_segment);
            let id = parts.next().filter(|id| !id.is_empty());
            return match (kind, id) {
                (Some(kind), Some(id)) => Ok(Self {
                    id: id.to_string(),
                    url: url.clone(),
                    kind,
                }),
                _ => Err(Error::InvalidLink(input.to_string())),
            };
        }

        let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        let typed = segments.windows(2).find_map(|pair| match pair {
            [kind, id] => LinkKind::from_segment(kind).map(|k| (k, *id)),
            _ => None,
        });

        let (kind, id) = match typed {
            Some((kind, id)) => (kind, id.to_string()),
            None => (
                LinkKind::Other,
                segments.last().copied().unwrap_or_default().to_string(),
            ),
        };

        Ok(Self { url, kind, id })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SpotifyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
