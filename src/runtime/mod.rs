use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::download::CommandDownloader;
use crate::error::{Error, Result};
use crate::library::normalize::PathNormalizer;
use crate::library::{LibraryIndex, OrganizeOptions, Organizer, RunSummary, scan};

mod prompt;
mod report;
mod settings;
mod sync;

pub fn run(cli: Cli) -> Result<()> {
    let mut settings = settings::load_settings(cli.config.as_deref())?;
    settings::apply_overrides(&mut settings, &cli);

    match cli.command.unwrap_or(Command::Sync { link: None }) {
        Command::Sync { link } => {
            let link = match link {
                Some(link) => link,
                None => prompt::read_link(io::stdin().lock(), io::stdout())?,
            };
            let downloader = CommandDownloader::from_settings(&settings.download);
            sync::sync(&settings, &link, &downloader, io::stdout().lock()).map(|_| ())
        }
        Command::Organize { dir } => {
            organize_dir(&settings, &settings.library.root, &dir, io::stdout().lock()).map(|_| ())
        }
        Command::Index => print_index(&settings, io::stdout().lock()),
        Command::Config => {
            let rendered = toml::to_string_pretty(&settings)?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn organizer(settings: &Settings, root: &Path) -> Organizer {
    Organizer::new(root)
        .with_normalizer(PathNormalizer::new(settings.organize.replacement))
        .with_options(OrganizeOptions {
            delete_duplicates: settings.organize.delete_duplicates,
        })
}

fn build_index(settings: &Settings, organizer: &Organizer) -> LibraryIndex {
    LibraryIndex::build(
        organizer.root(),
        settings.organize.duplicate_key,
        &settings.library,
        organizer.reader(),
        organizer.normalizer(),
    )
}

/// File every audio file under `dir` into the library at `root`.
fn organize_dir<W: Write>(settings: &Settings, root: &Path, dir: &Path, out: W) -> Result<RunSummary> {
    let organizer = organizer(settings, root);
    let mut index = build_index(settings, &organizer);
    organize_with(&organizer, &mut index, settings, dir, out)
}

fn organize_with<W: Write>(
    organizer: &Organizer,
    index: &mut LibraryIndex,
    settings: &Settings,
    dir: &Path,
    out: W,
) -> Result<RunSummary> {
    let inputs: Vec<PathBuf> = scan(dir, &settings.library)
        .into_iter()
        .map(|file| file.path)
        .collect();
    if inputs.is_empty() {
        info!(dir = %dir.display(), "no audio files to organize");
    }

    let results = organizer.organize(&inputs, index)?;
    let summary = report::write_report(out, &results)?;
    Ok(summary)
}

fn print_index<W: Write>(settings: &Settings, mut out: W) -> Result<()> {
    let organizer = organizer(settings, &settings.library.root);
    if !organizer.root().is_dir() {
        return Err(Error::RootUnavailable {
            path: organizer.root().to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "library root does not exist"),
        });
    }

    let index = build_index(settings, &organizer);
    writeln!(
        out,
        "{} tracks under {} (duplicate key: {})",
        index.len(),
        organizer.root().display(),
        index.policy()
    )?;
    for path in index.skipped() {
        writeln!(out, " ? {}", path.display())?;
    }
    Ok(())
}
