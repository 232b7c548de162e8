//! Application settings.
//!
//! Settings live in `settings.json` under the platform configuration
//! directory (`~/.config/nobu` on Linux). A missing file means defaults.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Defaults applied when the command line does not say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default number of concurrent probes per host.
    pub default_concurrency: usize,
    /// Default connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Grab banners unless told otherwise.
    pub banner_grab: bool,
    /// Colourise terminal output.
    pub color: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_concurrency: 100,
            default_timeout_ms: 1000,
            banner_grab: false,
            color: true,
        }
    }
}

impl AppSettings {
    /// Path of the settings file in the platform configuration directory.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let project =
            ProjectDirs::from("org", "nobu", "nobu").ok_or(ConfigError::DirectoryNotFound)?;
        Ok(project.config_dir().join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    /// when there is no settings file.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
