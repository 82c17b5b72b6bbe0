//! Persisted display settings and the file store that holds them
//!
//! Only the configuration survives a restart. Elapsed time and the pause flag
//! always start fresh.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StorageError, TimerError};

pub const DEFAULT_TOTAL_SECONDS: u64 = 2 * 60 * 60;
pub const DEFAULT_NUM_ENDS: u32 = 8;
/// Upper bound on ends; displays draw one box per end
pub const MAX_NUM_ENDS: u32 = 1000;
pub const DEFAULT_SETTINGS_FILE: &str = "pace_timer_config.json";
pub const DEFAULT_MESSAGE: &str = "Each end is 15 minutes alotted to complete a game in two hours. \
If you are playing too slowly then the timer will show an end that you haven't played yet. \
You should play faster to stay on pace.";

/// Configuration snapshot written to disk on every successful change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub total_seconds: u64,
    #[serde(rename = "num_ends", alias = "num_segments")]
    pub num_segments: u32,
    pub logo_url: String,
    pub message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_seconds: DEFAULT_TOTAL_SECONDS,
            num_segments: DEFAULT_NUM_ENDS,
            logo_url: String::new(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.total_seconds == 0 {
            return Err(TimerError::invalid("total must be > 0"));
        }
        validate_segments(i64::from(self.num_segments))?;
        Ok(())
    }
}

/// Partial settings change, as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seconds: Option<i64>,
    #[serde(default, alias = "num_segments", skip_serializing_if = "Option::is_none")]
    pub num_ends: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.total_seconds.is_none()
            && self.num_ends.is_none()
            && self.logo_url.is_none()
            && self.message.is_none()
    }
}

/// Validate a requested total duration
pub fn validate_total(seconds: i64) -> Result<u64, TimerError> {
    u64::try_from(seconds)
        .ok()
        .filter(|&s| s > 0)
        .ok_or_else(|| TimerError::invalid("total must be > 0"))
}

/// Validate a requested number of ends
pub fn validate_segments(count: i64) -> Result<u32, TimerError> {
    if count < 1 {
        return Err(TimerError::invalid("count must be >= 1"));
    }
    u32::try_from(count)
        .ok()
        .filter(|&c| c <= MAX_NUM_ENDS)
        .ok_or_else(|| TimerError::invalid(format!("count must be <= {}", MAX_NUM_ENDS)))
}

/// Storage backend for the settings snapshot
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    fn path(&self) -> &Path;
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Settings>, StorageError>;
    fn save(&self, settings: &Settings) -> Result<(), StorageError>;

    fn exists(&self) -> bool {
        self.path().exists()
    }
}

/// Settings stored as pretty-printed JSON at a fixed path
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}

impl SettingsStore for FileSettingsStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<Settings>, StorageError> {
        if !self.path.exists() {
            debug!("No settings file at {}", self.path.display());
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let settings: Settings =
            serde_json::from_slice(&bytes).map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })?;
        settings.validate().map_err(|reason| StorageError::Invalid {
            path: self.path.clone(),
            reason,
        })?;

        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let data = serde_json::to_vec_pretty(settings).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;

        // Write then rename so a reader never sees a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
