//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::window::DEFAULT_EXTENSION_THRESHOLD_DAYS;

static DEFAULT_MIRROR_TITLE: &str = "Booked";
const DEFAULT_DEBOUNCE_SECS: u64 = 3;

fn default_mirror_title() -> String {
    DEFAULT_MIRROR_TITLE.to_string()
}

fn default_debounce_secs() -> u64 {
    DEFAULT_DEBOUNCE_SECS
}

fn default_extension_threshold_days() -> u32 {
    DEFAULT_EXTENSION_THRESHOLD_DAYS
}

/// Configuration at ~/.config/booked/config.toml
///
/// Every field has a default; a missing file means default configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed title written to every mirrored event. Never a source title.
    #[serde(default = "default_mirror_title")]
    pub mirror_title: String,

    /// Quiet period before a triggered sync actually runs.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,

    /// Days left in the current month below which the planning window
    /// extends through the next month.
    #[serde(default = "default_extension_threshold_days")]
    pub extension_threshold_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            mirror_title: default_mirror_title(),
            debounce_secs: default_debounce_secs(),
            extension_threshold_days: default_extension_threshold_days(),
        }
    }
}

impl SyncConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("booked");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> SyncResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("Could not read config file: {e}")))?;

        toml::from_str(&contents).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}
