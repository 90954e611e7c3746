use super::metadata::{ReadMetadata, TagReader, infer_from_path};
use super::model::{Metadata, TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use super::organize::{FsMover, MoveFile};
use super::*;
use crate::config::{DuplicateKeyPolicy, LibrarySettings};
use crate::error::Error;
use crate::library::normalize::PathNormalizer;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Tags keyed by file name; everything else goes through the file-name fallback.
#[derive(Default)]
struct FixtureReader(HashMap<String, TrackMetadata>);

impl FixtureReader {
    fn tag(mut self, file_name: &str, artist: &str, album: &str, n: Option<u32>, title: &str) -> Self {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.0.insert(
            file_name.to_string(),
            TrackMetadata::new(Some(artist), Some(album), n, Some(title), ext),
        );
        self
    }
}

impl ReadMetadata for FixtureReader {
    fn read(&self, path: &Path) -> Metadata {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match self.0.get(name) {
            Some(t) => Metadata::Tagged(t.clone()),
            None => infer_from_path(path),
        }
    }
}

/// Fails every move whose source file name is `fail_on`.
struct FailingMover {
    fail_on: &'static str,
}

impl MoveFile for FailingMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from.file_name().and_then(|n| n.to_str()) == Some(self.fail_on) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        FsMover.move_file(from, to)
    }
}

fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    names
        .iter()
        .map(|name| {
            let p = dir.join(name);
            fs::write(&p, format!("audio bytes of {name}")).unwrap();
            p
        })
        .collect()
}

fn build_index<R: ReadMetadata>(root: &Path, policy: DuplicateKeyPolicy, reader: &R) -> LibraryIndex {
    LibraryIndex::build(
        root,
        policy,
        &LibrarySettings::default(),
        reader,
        &PathNormalizer::default(),
    )
}

#[test]
fn unicode_track_lands_in_canonical_path_and_second_copy_is_a_duplicate() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let staging = tmp.path().join("staging");
    let inputs = write_files(&staging, &["first.mp3", "second.mp3"]);

    let reader = FixtureReader::default()
        .tag("first.mp3", "日本のアーティスト", "アルバム", Some(1), "曲")
        .tag("second.mp3", "日本のアーティスト", "アルバム", Some(1), "曲");

    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &reader);
    assert!(index.is_empty());

    let organizer = Organizer::new(&root).with_reader(reader);
    let results = organizer.organize(&inputs, &mut index).unwrap();

    let expected = root.join("日本のアーティスト").join("アルバム").join("01 - 曲.mp3");
    assert_eq!(
        results[0],
        OrganizeResult::Moved {
            source: inputs[0].clone(),
            destination: expected.clone(),
        }
    );
    assert_eq!(
        results[1],
        OrganizeResult::SkippedDuplicate {
            source: inputs[1].clone(),
            existing: expected.clone(),
            removed: false,
        }
    );
    assert_eq!(fs::read_to_string(&expected).unwrap(), "audio bytes of first.mp3");
    assert!(!inputs[0].exists());
    assert!(inputs[1].exists());
}

#[test]
fn second_run_with_the_same_inputs_moves_nothing() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let names = ["Artist - One.mp3", "Artist - Two.mp3", "07 - Seven.flac", "noise.ogg"];

    let first = write_files(&tmp.path().join("staging-1"), &names);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    let results = Organizer::new(&root).organize(&first, &mut index).unwrap();
    assert_eq!(RunSummary::from_results(&results).moved, 4);
    assert!(root.join("Artist").join(UNKNOWN_ALBUM).join("One.mp3").is_file());
    assert!(
        root.join(UNKNOWN_ARTIST)
            .join(UNKNOWN_ALBUM)
            .join("07 - Seven.flac")
            .is_file()
    );

    let second = write_files(&tmp.path().join("staging-2"), &names);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    assert_eq!(index.len(), 4);
    let results = Organizer::new(&root).organize(&second, &mut index).unwrap();

    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.moved, 0);
    assert_eq!(summary.skipped_duplicate, 4);
    assert!(second.iter().all(|p| p.exists()));
}

#[test]
fn organizing_the_library_itself_is_a_no_op() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let staging = write_files(
        &tmp.path().join("staging"),
        &["Band - Song.mp3", "01 - Intro.mp3", "plain.wav"],
    );

    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    Organizer::new(&root).organize(&staging, &mut index).unwrap();

    let before: Vec<PathBuf> = scan(&root, &LibrarySettings::default())
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(before.len(), 3);

    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    let organizer = Organizer::new(&root).with_options(OrganizeOptions {
        delete_duplicates: true,
    });
    let results = organizer.organize(&before, &mut index).unwrap();

    for (result, path) in results.iter().zip(&before) {
        assert_eq!(
            *result,
            OrganizeResult::SkippedDuplicate {
                source: path.clone(),
                existing: path.clone(),
                removed: false,
            }
        );
        assert!(path.is_file());
    }
}

#[test]
fn duplicate_source_is_left_alone_unless_deletion_is_enabled() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let existing = write_files(&root.join("Band").join("Album"), &["01 - Song.mp3"]).remove(0);
    let staging = tmp.path().join("staging");
    let reader = || {
        FixtureReader::default()
            .tag("incoming.mp3", "Band", "Album", Some(1), "Song")
            .tag("again.mp3", "band", "ALBUM", Some(1), "Song (Remaster)")
    };

    let inputs = write_files(&staging, &["incoming.mp3"]);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &reader());
    let results = Organizer::new(&root)
        .with_reader(reader())
        .organize(&inputs, &mut index)
        .unwrap();
    assert!(matches!(
        &results[0],
        OrganizeResult::SkippedDuplicate { removed: false, existing: e, .. } if *e == existing
    ));
    assert_eq!(fs::read_to_string(&inputs[0]).unwrap(), "audio bytes of incoming.mp3");

    let inputs = write_files(&staging, &["again.mp3"]);
    let results = Organizer::new(&root)
        .with_reader(reader())
        .with_options(OrganizeOptions {
            delete_duplicates: true,
        })
        .organize(&inputs, &mut index)
        .unwrap();
    assert!(matches!(
        results[0],
        OrganizeResult::SkippedDuplicate { removed: true, .. }
    ));
    assert!(!inputs[0].exists());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "audio bytes of 01 - Song.mp3");
}

#[test]
fn one_failing_file_does_not_stop_the_batch() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let names = ["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"];
    let inputs = write_files(&tmp.path().join("staging"), &names);

    let reader = FixtureReader::default()
        .tag("a.mp3", "Band", "Album", Some(1), "A")
        .tag("b.mp3", "Band", "Album", Some(2), "B")
        .tag("c.mp3", "Band", "Album", Some(3), "C")
        .tag("d.mp3", "Band", "Album", Some(4), "D")
        .tag("e.mp3", "Band", "Album", Some(2), "B again");

    let mut index = LibraryIndex::new(DuplicateKeyPolicy::TrackNumber);
    let results = Organizer::new(&root)
        .with_reader(reader)
        .with_mover(FailingMover { fail_on: "c.mp3" })
        .organize(&inputs, &mut index)
        .unwrap();

    assert_eq!(results.len(), 5);
    let errors: Vec<&OrganizeResult> = results
        .iter()
        .filter(|r| matches!(r, OrganizeResult::SkippedError { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source(), inputs[2].as_path());
    match errors[0] {
        OrganizeResult::SkippedError { reason, .. } => assert!(reason.contains("permission denied")),
        _ => unreachable!(),
    }

    assert_eq!(
        RunSummary::from_results(&results),
        RunSummary {
            moved: 3,
            skipped_duplicate: 1,
            skipped_error: 1,
        }
    );
    assert!(inputs[2].exists());
    assert!(root.join("Band").join("Album").join("04 - D.mp3").is_file());
}

#[test]
fn unusable_root_aborts_the_run() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("not-a-dir");
    fs::write(&root, b"occupied").unwrap();
    let inputs = write_files(&tmp.path().join("staging"), &["Band - Song.mp3"]);

    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    let err = Organizer::new(&root)
        .organize(&inputs, &mut index)
        .unwrap_err();

    assert!(matches!(err, Error::RootUnavailable { .. }));
    assert!(inputs[0].exists());
}

#[test]
fn missing_source_is_reported_per_file() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let mut inputs = write_files(&tmp.path().join("staging"), &["Band - Song.mp3"]);
    inputs.insert(0, tmp.path().join("staging").join("vanished.mp3"));

    let mut index = LibraryIndex::new(DuplicateKeyPolicy::TrackNumber);
    let results = Organizer::new(&root).organize(&inputs, &mut index).unwrap();

    assert!(matches!(results[0], OrganizeResult::SkippedError { .. }));
    assert!(matches!(results[1], OrganizeResult::Moved { .. }));
}

#[test]
fn existing_destination_is_never_overwritten_even_when_unindexed() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let existing = write_files(&root.join("Band").join(UNKNOWN_ALBUM), &["Song.mp3"]).remove(0);
    let inputs = write_files(&tmp.path().join("staging"), &["Band - Song.mp3"]);

    let mut index = LibraryIndex::new(DuplicateKeyPolicy::TrackNumber);
    let results = Organizer::new(&root).organize(&inputs, &mut index).unwrap();

    assert!(matches!(results[0], OrganizeResult::SkippedDuplicate { .. }));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "audio bytes of Song.mp3");
    assert_eq!(index.len(), 1);
}

#[test]
fn title_policy_matches_across_artists() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let inputs = write_files(&tmp.path().join("staging"), &["x.mp3", "y.mp3"]);
    let reader = FixtureReader::default()
        .tag("x.mp3", "First", "One", Some(1), "Same Song")
        .tag("y.mp3", "Second", "Two", Some(5), "same song");

    let mut index = LibraryIndex::new(DuplicateKeyPolicy::Title);
    let results = Organizer::new(&root)
        .with_reader(reader)
        .organize(&inputs, &mut index)
        .unwrap();

    assert!(matches!(results[0], OrganizeResult::Moved { .. }));
    assert!(matches!(results[1], OrganizeResult::SkippedDuplicate { .. }));
}

#[test]
fn unsafe_tag_values_become_safe_segments() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let inputs = write_files(&tmp.path().join("staging"), &["t.mp3"]);
    let reader = FixtureReader::default().tag("t.mp3", "AC/DC", "Live: 1992?", Some(3), "T.N.T.");

    let mut index = LibraryIndex::new(DuplicateKeyPolicy::TrackNumber);
    let results = Organizer::new(&root)
        .with_reader(reader)
        .with_normalizer(PathNormalizer::new('-'))
        .organize(&inputs, &mut index)
        .unwrap();

    assert_eq!(
        results[0],
        OrganizeResult::Moved {
            source: inputs[0].clone(),
            destination: root.join("AC-DC").join("Live- 1992-").join("03 - T.N.T.mp3"),
        }
    );
}

#[test]
fn leading_dot_artist_is_indexed_on_the_next_run() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let artist = "...And You Will Know Us";
    let reader = FixtureReader::default()
        .tag("a.mp3", artist, "Source Tags", Some(1), "Song")
        .tag("b.mp3", artist, "Source Tags", Some(1), "Song (Remaster)");

    let first = write_files(&tmp.path().join("staging-1"), &["a.mp3"]);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &reader);
    let organizer = Organizer::new(&root).with_reader(reader);
    let results = organizer.organize(&first, &mut index).unwrap();

    let expected = root
        .join("_...And You Will Know Us")
        .join("Source Tags")
        .join("01 - Song.mp3");
    assert_eq!(
        results[0],
        OrganizeResult::Moved {
            source: first[0].clone(),
            destination: expected.clone(),
        }
    );

    let second = write_files(&tmp.path().join("staging-2"), &["b.mp3"]);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, organizer.reader());
    assert_eq!(index.len(), 1);
    let results = organizer.organize(&second, &mut index).unwrap();

    assert_eq!(
        results[0],
        OrganizeResult::SkippedDuplicate {
            source: second[0].clone(),
            existing: expected,
            removed: false,
        }
    );
}

#[test]
fn long_multibyte_title_is_moved_and_found_again() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let title = "曲".repeat(100);
    let reader = FixtureReader::default()
        .tag("long.mp3", "日本のアーティスト", "アルバム", Some(1), &title)
        .tag("again.mp3", "日本のアーティスト", "アルバム", Some(1), &title);

    let inputs = write_files(&tmp.path().join("staging"), &["long.mp3"]);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &reader);
    let organizer = Organizer::new(&root).with_reader(reader);
    let results = organizer.organize(&inputs, &mut index).unwrap();

    let OrganizeResult::Moved { destination, .. } = &results[0] else {
        panic!("expected a move, got {:?}", results[0]);
    };
    assert!(destination.is_file());
    let name = destination.file_name().unwrap().to_str().unwrap();
    assert!(name.len() <= 255, "{} bytes", name.len());

    let again = write_files(&tmp.path().join("staging-2"), &["again.mp3"]);
    let mut index = build_index(&root, DuplicateKeyPolicy::TrackNumber, organizer.reader());
    let results = organizer.organize(&again, &mut index).unwrap();
    assert!(matches!(results[0], OrganizeResult::SkippedDuplicate { .. }));
}

#[test]
fn index_tolerates_missing_root_and_skips_files_outside_the_layout() {
    let tmp = tempdir().unwrap();
    let missing = build_index(&tmp.path().join("nope"), DuplicateKeyPolicy::TrackNumber, &TagReader);
    assert!(missing.is_empty());
    assert!(missing.skipped().is_empty());

    let root = tmp.path().join("library");
    write_files(&root.join("Band").join("Album"), &["01 - Intro.mp3", "Outro.mp3"]);
    write_files(&root.join("Band"), &["stray.mp3"]);
    write_files(&root, &["loose.mp3", "cover.jpg"]);

    let index = build_index(&root, DuplicateKeyPolicy::TrackNumber, &TagReader);
    assert_eq!(index.len(), 2);
    assert_eq!(index.skipped().len(), 2);
    assert_eq!(index.policy(), DuplicateKeyPolicy::TrackNumber);
}

#[cfg(unix)]
#[test]
fn index_reports_entries_it_cannot_read() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    let album = root.join("Band").join("Album");
    write_files(&album, &["01 - Intro.mp3"]);
    std::os::unix::fs::symlink(root.join("Band"), album.join("loop")).unwrap();

    let settings = LibrarySettings {
        follow_links: true,
        ..LibrarySettings::default()
    };
    let index = LibraryIndex::build(
        &root,
        DuplicateKeyPolicy::TrackNumber,
        &settings,
        &TagReader,
        &PathNormalizer::default(),
    );

    assert_eq!(index.len(), 1);
    assert_eq!(index.skipped(), &[album.join("loop")]);
}

#[test]
fn summary_renders_all_counts() {
    let summary = RunSummary {
        moved: 2,
        skipped_duplicate: 1,
        skipped_error: 0,
    };
    assert_eq!(
        summary.to_string(),
        "moved: 2, skipped (duplicate): 1, skipped (error): 0"
    );
}
