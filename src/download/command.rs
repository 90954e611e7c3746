use std::path::Path;
use std::process::Command;

use tracing::info;

use super::link::SpotifyLink;
use crate::config::DownloadSettings;
use crate::error::{Error, Result};

/// Lists and fetches the tracks behind a link.
pub trait Downloader {
    /// Write the JSON track list for `link` to `save_file`.
    fn save_list(&self, link: &SpotifyLink, save_file: &Path) -> Result<()>;

    /// Fetch one track, given as a URL or a search query, into `staging`.
    fn download(&self, target: &str, staging: &Path) -> Result<()>;
}

/// Runs an external downloader (spotdl by default) and waits for it.
#[derive(Debug, Clone)]
pub struct CommandDownloader {
    program: String,
    args: Vec<String>,
    save_args: Vec<String>,
}

impl CommandDownloader {
    pub fn new(program: impl Into<String>, args: Vec<String>, save_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            save_args,
        }
    }

    pub fn from_settings(settings: &DownloadSettings) -> Self {
        Self::new(
            settings.program.trim(),
            settings.args.clone(),
            settings.save_args.clone(),
        )
    }

    /// Download arguments with `{url}` and `{staging}` filled in. Other braces
    /// are the downloader's own template syntax and pass through untouched.
    pub fn download_args(&self, target: &str, staging: &Path) -> Vec<String> {
        let staging = staging.to_string_lossy();
        expand(&self.args, &[("{url}", target), ("{staging}", &*staging)])
    }

    pub fn save_args(&self, link: &SpotifyLink, save_file: &Path) -> Vec<String> {
        let save_file = save_file.to_string_lossy();
        expand(
            &self.save_args,
            &[("{url}", link.url()), ("{save_file}", &*save_file)],
        )
    }

    fn run(&self, args: &[String]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| Error::Download {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::Download {
                program: self.program.clone(),
                reason: format!("exited with {status}"),
            });
        }
        Ok(())
    }
}

fn expand(args: &[String], substitutions: &[(&str, &str)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            substitutions
                .iter()
                .fold(arg.clone(), |arg, &(from, to)| arg.replace(from, to))
        })
        .collect()
}

impl Downloader for CommandDownloader {
    fn save_list(&self, link: &SpotifyLink, save_file: &Path) -> Result<()> {
        info!(program = %self.program, link = %link, "fetching track list");
        self.run(&self.save_args(link, save_file))
    }

    fn download(&self, target: &str, staging: &Path) -> Result<()> {
        info!(program = %self.program, query = target, staging = %staging.display(), "downloading");
        self.run(&self.download_args(target, staging))
    }
}
