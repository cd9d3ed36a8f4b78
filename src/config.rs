//! Configuration loading
//!
//! Optional JSON file at `$T_CONFIG`, else `<config dir>/t/config.json`.
//! Command-line flags win over anything set here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::listing::SortKey;
use crate::storage::DEFAULT_LIST;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "T_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the list files
    pub task_dir: Option<PathBuf>,

    /// List to work on when `--list` is not given
    pub list: Option<String>,

    /// Remove a list file instead of leaving it empty
    pub delete_if_empty: bool,

    /// Listing order
    pub sort: SortKey,

    /// Stamp `updated` metadata on add, edit and finish
    pub track_updates: bool,
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => dirs::config_dir().map(|dir| dir.join("t").join("config.json")),
        }
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Task directory: the configured one, else the home directory, else `.`.
    pub fn task_dir(&self) -> PathBuf {
        self.task_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn list(&self) -> &str {
        self.list.as_deref().unwrap_or(DEFAULT_LIST)
    }
}
