//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::commands::CommandError;
use crate::{error::TimerError, settings::Settings, state::TimerSnapshot};

/// Envelope returned by every control endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the change was applied but something around it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TimerSnapshot>,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, status: TimerSnapshot) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            error: None,
            warning: None,
            status: Some(status),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(error.into()),
            warning: None,
            status: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

/// Rejected request, rendered as `{ok: false, error}` with a 400
#[derive(Debug)]
pub struct ApiError(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(self.0))).into_response()
    }
}

impl From<CommandError> for ApiError {
    fn from(e: CommandError) -> Self {
        Self(e.to_string())
    }
}

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self(e.to_string())
    }
}

/// Settings file contents next to what the process is actually using
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugResponse {
    pub settings_file: String,
    pub config_file_exists: bool,
    pub file_config: Option<Settings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_error: Option<String>,
    pub live_config: Settings,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
}

impl HealthResponse {
    pub fn ok(uptime: String) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
        }
    }
}
