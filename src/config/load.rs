use std::{
    env,
    path::{Path, PathBuf},
};

use super::schema::Settings;
use crate::library::normalize::{is_safe_replacement, normalize};

/// Configuration loading helpers.
///
/// `Settings::load` reads the optional config file, then lets environment
/// variables (prefix `SPOTSHELF__`) override it, falling back to struct defaults.
impl Settings {
    /// Load settings from the optional config file and the environment.
    ///
    /// `explicit` (from `--config`) wins over `SPOTSHELF_CONFIG_PATH` and the
    /// XDG default.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(resolve_config_path);

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(
                ::config::File::from(path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(explicit.is_some()),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SPOTSHELF")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.extensions")
                .with_list_parse_key("download.args")
                .with_list_parse_key("download.save_args")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self
            .library
            .extensions
            .iter()
            .any(|e| !e.trim().trim_start_matches('.').is_empty())
        {
            return Err("library.extensions must list at least one extension".to_string());
        }
        let r = self.organize.replacement;
        if !is_safe_replacement(r) {
            return Err(format!(
                "organize.replacement {r:?} is itself unsafe in file names"
            ));
        }
        if self.download.program.trim().is_empty() {
            return Err("download.program must not be empty".to_string());
        }
        let singles = &self.library.singles_folder;
        if singles.is_empty() || normalize(singles) != *singles {
            return Err(format!(
                "library.singles_folder {singles:?} is not a safe folder name"
            ));
        }
        Ok(())
    }

    /// Library root for a synced list. With `per_list_folders` each playlist
    /// or album gets its own folder and single tracks share `singles_folder`.
    pub fn library_root_for(&self, list_name: Option<&str>) -> PathBuf {
        let root = &self.library.root;
        if !self.library.per_list_folders {
            return root.clone();
        }
        match list_name.map(normalize).filter(|name| !name.is_empty()) {
            Some(name) => root.join(name),
            None => root.join(&self.library.singles_folder),
        }
    }

    /// Staging directory for downloads, defaulting to a hidden folder inside the library root.
    pub fn staging_dir(&self) -> PathBuf {
        self.download
            .staging_dir
            .clone()
            .unwrap_or_else(|| self.library.root.join(".incoming"))
    }
}

/// Resolve the config path from `SPOTSHELF_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SPOTSHELF_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/spotshelf/config.toml`
/// or `~/.config/spotshelf/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("spotshelf").join("config.toml"))
}
