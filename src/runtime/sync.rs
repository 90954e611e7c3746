use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{build_index, organize_with, organizer};
use crate::config::Settings;
use crate::download::{Downloader, SavedList, SavedTrack, SpotifyLink};
use crate::error::Result;
use crate::library::normalize::normalize;
use crate::library::path::CanonicalPath;
use crate::library::{LibraryIndex, Organizer, RunSummary};

/// Fetch the track list behind `link`, download what the library lacks into
/// staging, then file the staging directory into the library.
///
/// A broken link, a failed list fetch or an unreadable list abort the run. A
/// single failed track download does not.
pub fn sync<D: Downloader, W: Write>(
    settings: &Settings,
    link: &str,
    downloader: &D,
    mut out: W,
) -> Result<RunSummary> {
    let link = SpotifyLink::parse(link)?;
    let staging = settings.staging_dir();
    fs::create_dir_all(&staging)?;

    let list = fetch_list(&link, downloader, &staging)?;
    let root = settings.library_root_for(list.name());
    info!(link = %link, tracks = list.tracks.len(), root = %root.display(), "track list");

    let organizer = organizer(settings, &root);
    let mut index = build_index(settings, &organizer);

    let missing = if settings.download.skip_existing {
        missing_tracks(&list, &organizer, &index)
    } else {
        list.tracks.iter().collect()
    };
    writeln!(out, "{} of {} tracks to download", missing.len(), list.tracks.len())?;
    for track in &missing {
        let meta = track.metadata();
        writeln!(out, " + {} - {}", meta.artist, meta.title)?;
    }

    for track in missing {
        let target = track.download_target();
        if let Err(e) = downloader.download(&target, &staging) {
            warn!(query = %target, error = %e, "download failed, continuing");
        }
    }

    organize_with(&organizer, &mut index, settings, &staging, out)
}

fn fetch_list<D: Downloader>(
    link: &SpotifyLink,
    downloader: &D,
    staging: &Path,
) -> Result<SavedList> {
    let stem = Some(normalize(link.id()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "tracks".to_string());
    let save_file = staging.join(format!("{stem}.spotdl"));

    downloader.save_list(link, &save_file)?;
    let list = SavedList::load(&save_file)?;
    if let Err(e) = fs::remove_file(&save_file) {
        debug!(path = %save_file.display(), error = %e, "track list left in staging");
    }
    Ok(list)
}

/// Tracks whose duplicate key nothing in the library holds yet.
fn missing_tracks<'a>(
    list: &'a SavedList,
    organizer: &Organizer,
    index: &LibraryIndex,
) -> Vec<&'a SavedTrack> {
    list.tracks
        .iter()
        .filter(|track| {
            let path = CanonicalPath::from_metadata(&track.metadata(), organizer.normalizer());
            match index.get(&path.key(index.policy())) {
                Some(existing) => {
                    debug!(existing = %existing.display(), "already in library");
                    false
                }
                None => true,
            }
        })
        .collect()
}
