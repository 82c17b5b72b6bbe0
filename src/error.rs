//! Error types shared across the timer core and its collaborators

use std::path::PathBuf;

/// Rejected timer operation. The timer state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("{0}")]
    InvalidConfig(String),
}

impl TimerError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Failure reading or writing the settings snapshot
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings file {} does not exist", .path.display())]
    Missing { path: PathBuf },

    #[error("settings file {} rejected: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: TimerError },
}
