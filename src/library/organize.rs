use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::index::{LibraryIndex, classify};
use super::metadata::{ReadMetadata, TagReader};
use super::model::TrackMetadata;
use super::normalize::PathNormalizer;
use super::path::CanonicalPath;
use crate::error::{Error, FileError, Result};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeResult {
    Moved {
        source: PathBuf,
        destination: PathBuf,
    },
    /// The library already holds this track at `existing`. `removed` is set
    /// when the incoming copy was deleted.
    SkippedDuplicate {
        source: PathBuf,
        existing: PathBuf,
        removed: bool,
    },
    SkippedError {
        source: PathBuf,
        reason: String,
    },
}

impl OrganizeResult {
    pub fn source(&self) -> &Path {
        match self {
            OrganizeResult::Moved { source, .. }
            | OrganizeResult::SkippedDuplicate { source, .. }
            | OrganizeResult::SkippedError { source, .. } => source,
        }
    }
}

/// Moves a file to a destination that does not exist yet.
///
/// Implementations must never leave a truncated file at `to`.
pub trait MoveFile {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Rename, or copy through a temporary file when crossing filesystems.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl MoveFile for FsMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to),
            Err(e) => Err(e),
        }
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let dir = to.parent().unwrap_or_else(|| Path::new("."));
    let mut partial = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)?;

    let mut src = File::open(from)?;
    io::copy(&mut src, partial.as_file_mut())?;
    partial.as_file().sync_all()?;
    partial.persist_noclobber(to).map_err(|e| e.error)?;

    fs::remove_file(from)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OrganizeOptions {
    /// Delete incoming files that turn out to be duplicates.
    pub delete_duplicates: bool,
}

/// Files audio into `<root>/<Artist>/<Album>/<NN - Title>.<ext>`.
pub struct Organizer<R = TagReader, M = FsMover> {
    root: PathBuf,
    reader: R,
    mover: M,
    normalizer: PathNormalizer,
    options: OrganizeOptions,
}

impl Organizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reader: TagReader,
            mover: FsMover,
            normalizer: PathNormalizer::default(),
            options: OrganizeOptions::default(),
        }
    }
}

impl<R: ReadMetadata, M: MoveFile> Organizer<R, M> {
    pub fn with_reader<R2: ReadMetadata>(self, reader: R2) -> Organizer<R2, M> {
        Organizer {
            root: self.root,
            reader,
            mover: self.mover,
            normalizer: self.normalizer,
            options: self.options,
        }
    }

    pub fn with_mover<M2: MoveFile>(self, mover: M2) -> Organizer<R, M2> {
        Organizer {
            root: self.root,
            reader: self.reader,
            mover,
            normalizer: self.normalizer,
            options: self.options,
        }
    }

    pub fn with_normalizer(mut self, normalizer: PathNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_options(mut self, options: OrganizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// The library root must exist (it is created if missing), be a directory
    /// and accept new files.
    pub fn ensure_root(&self) -> Result<()> {
        let unavailable = |source: io::Error| Error::RootUnavailable {
            path: self.root.clone(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(unavailable)?;
        tempfile::Builder::new()
            .prefix(".spotshelf-write-check-")
            .tempfile_in(&self.root)
            .map_err(unavailable)?;
        Ok(())
    }

    /// Organize `inputs` in order.
    ///
    /// Only an unusable library root aborts the run; everything else is
    /// reported per file. `index` gains an entry for every file moved in.
    pub fn organize(
        &self,
        inputs: &[PathBuf],
        index: &mut LibraryIndex,
    ) -> Result<Vec<OrganizeResult>> {
        self.ensure_root()?;

        let mut results = Vec::with_capacity(inputs.len());
        for source in inputs {
            let result = match self.organize_file(source, index) {
                Ok(result) => result,
                Err(e) => {
                    warn!(source = %source.display(), error = %e, "skipped");
                    OrganizeResult::SkippedError {
                        source: source.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    fn organize_file(
        &self,
        source: &Path,
        index: &mut LibraryIndex,
    ) -> std::result::Result<OrganizeResult, FileError> {
        if !source.is_file() {
            return Err(FileError::MissingSource(source.to_path_buf()));
        }

        let meta = self.read_metadata(source);
        let canonical = CanonicalPath::from_metadata(&meta, &self.normalizer);
        let key = canonical.key(index.policy());
        let destination = canonical.under(&self.root);

        let existing = match index.get(&key) {
            Some(existing) => Some(existing.to_path_buf()),
            None if destination.exists() => {
                index.insert(key.clone(), destination.clone());
                Some(destination.clone())
            }
            None => None,
        };

        if let Some(existing) = existing {
            let removed = self.options.delete_duplicates && !same_file(source, &existing);
            if removed {
                fs::remove_file(source).map_err(FileError::RemoveDuplicate)?;
                info!(source = %source.display(), existing = %existing.display(), "removed duplicate");
            } else {
                debug!(source = %source.display(), existing = %existing.display(), "already in library");
            }
            return Ok(OrganizeResult::SkippedDuplicate {
                source: source.to_path_buf(),
                existing,
                removed,
            });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| FileError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        self.mover
            .move_file(source, &destination)
            .map_err(|e| FileError::Move {
                destination: destination.clone(),
                source: e,
            })?;

        info!(source = %source.display(), destination = %destination.display(), "moved");
        index.insert(key, destination.clone());

        Ok(OrganizeResult::Moved {
            source: source.to_path_buf(),
            destination,
        })
    }

    /// Files already inside the library layout are read the way the indexer
    /// reads them, so re-organizing the library finds every file in place.
    fn read_metadata(&self, source: &Path) -> TrackMetadata {
        // Hidden directories under the root (staging) are not part of the layout.
        let depth = source
            .strip_prefix(&self.root)
            .ok()
            .filter(|rel| {
                !rel.components()
                    .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            })
            .map(|rel| rel.components().count());

        depth
            .and_then(|d| classify(source, d, &self.reader))
            .unwrap_or_else(|| self.reader.read(source).into_track())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Per-outcome counts for the end-of-run report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub moved: usize,
    pub skipped_duplicate: usize,
    pub skipped_error: usize,
}

impl RunSummary {
    pub fn from_results(results: &[OrganizeResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                match result {
                    OrganizeResult::Moved { .. } => summary.moved += 1,
                    OrganizeResult::SkippedDuplicate { .. } => summary.skipped_duplicate += 1,
                    OrganizeResult::SkippedError { .. } => summary.skipped_error += 1,
                }
                summary
            })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "moved: {}, skipped (duplicate): {}, skipped (error): {}",
            self.moved, self.skipped_duplicate, self.skipped_error
        )
    }
}
