use std::path::Path;

use tracing::{info, warn};

use crate::cli::Cli;
use crate::config;
use crate::error::{Error, Result};

/// Load settings, falling back to defaults when the implicit config is
/// broken. A config file named with `--config` must load and validate.
pub fn load_settings(explicit: Option<&Path>) -> Result<config::Settings> {
    match config::Settings::load(explicit) {
        Ok(s) => match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) if explicit.is_some() => Err(Error::InvalidConfig(msg)),
            Err(msg) => {
                warn!("invalid config, using defaults: {msg}");
                Ok(config::Settings::default())
            }
        },
        Err(e) if explicit.is_some() => Err(Error::Config(e)),
        Err(e) => {
            // Config is optional; failures should not prevent a run.
            warn!("failed to load config, using defaults: {e}");
            Ok(config::Settings::default())
        }
    }
}

/// Command-line flags win over every other source.
pub fn apply_overrides(settings: &mut config::Settings, cli: &Cli) {
    if let Some(root) = &cli.library_root {
        settings.library.root = root.clone();
    }
    if let Some(policy) = cli.duplicate_key {
        settings.organize.duplicate_key = policy;
    }
    if cli.delete_duplicates {
        settings.organize.delete_duplicates = true;
    }
    info!(
        root = %settings.library.root.display(),
        duplicate_key = ?settings.organize.duplicate_key,
        delete_duplicates = settings.organize.delete_duplicates,
        "settings resolved"
    );
}
