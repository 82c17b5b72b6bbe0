//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Json,
};
use tracing::{debug, error, warn};

use super::{
    commands::{
        adjust_command, set_ends_command, set_remaining_command, set_total_command, CountParams,
        TimeParams,
    },
    responses::{ApiError, ApiResponse, DebugResponse, HealthResponse},
};
use crate::{
    progress::ProgressView,
    settings::{Settings, SettingsUpdate},
    state::{AppState, Command, TimerSnapshot},
};

type ApiResult = Result<Json<ApiResponse>, ApiError>;

/// Apply one command, persisting settings afterwards when it changed them
async fn run_command(state: &Arc<AppState>, command: Command, message: String) -> ApiResult {
    let persist = command.changes_settings();
    let snapshot = state.apply(command)?;

    let warning = if persist {
        persist_settings(state).await
    } else {
        None
    };

    Ok(Json(ApiResponse::success(message, snapshot).with_warning(warning)))
}

/// Write settings off the async workers. Failure is reported, never rolled back.
async fn persist_settings(state: &Arc<AppState>) -> Option<String> {
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || state.save_settings()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(format!("Configuration applied but could not be saved: {}", e)),
        Err(e) => {
            error!("Settings save task failed: {}", e);
            Some(format!("Configuration applied but could not be saved: {}", e))
        }
    }
}

/// Handle GET /status - Raw timer state, including overtime
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<TimerSnapshot> {
    let snapshot = state.status();
    debug!("Status requested: elapsed={}s", snapshot.elapsed_seconds);
    Json(snapshot)
}

/// Handle GET /view - Render-ready progress for remote displays
pub async fn view_handler(State(state): State<Arc<AppState>>) -> Json<ProgressView> {
    Json(state.view())
}

/// Handle POST /reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_command(&state, Command::Reset, "timer reset".to_string()).await
}

/// Handle POST /pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_command(&state, Command::Pause, "timer paused".to_string()).await
}

/// Handle POST /resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_command(&state, Command::Resume, "timer resumed".to_string()).await
}

/// Handle POST /toggle - Pause if running, resume if paused
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let Json(mut response) = run_command(&state, Command::TogglePause, String::new()).await?;
    let paused = response.status.as_ref().is_some_and(|s| s.paused);
    response.message = Some(if paused { "timer paused" } else { "timer resumed" }.to_string());
    Ok(Json(response))
}

/// Handle POST /add_time[?seconds=N]
pub async fn add_time_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeParams>,
) -> ApiResult {
    let command = adjust_command(&params, true).inspect_err(|e| warn!("add_time: {}", e))?;
    let message = match &command {
        Command::AddTime(seconds) => format!("Added {} seconds", seconds),
        _ => "time added".to_string(),
    };
    run_command(&state, command, message).await
}

/// Handle POST /subtract_time[?seconds=N]
pub async fn subtract_time_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeParams>,
) -> ApiResult {
    let command = adjust_command(&params, false).inspect_err(|e| warn!("subtract_time: {}", e))?;
    let message = match &command {
        Command::SubtractTime(seconds) => format!("Subtracted {} seconds", seconds),
        _ => "time subtracted".to_string(),
    };
    run_command(&state, command, message).await
}

/// Handle POST /set_remaining?seconds=S | ?time=H:MM:SS
pub async fn set_remaining_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeParams>,
) -> ApiResult {
    let command = set_remaining_command(&params).inspect_err(|e| warn!("set_remaining: {}", e))?;
    run_command(&state, command, "remaining set".to_string()).await
}

/// Handle POST /set_total?seconds=S | ?time=H:MM:SS
pub async fn set_total_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeParams>,
) -> ApiResult {
    let command = set_total_command(&params).inspect_err(|e| warn!("set_total: {}", e))?;
    run_command(&state, command, "total set".to_string()).await
}

/// Handle POST /set_ends?count=N
pub async fn set_ends_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountParams>,
) -> ApiResult {
    let command = set_ends_command(&params).inspect_err(|e| warn!("set_ends: {}", e))?;
    run_command(&state, command, "ends set".to_string()).await
}

/// Handle GET /config - Settings the process is running with
pub async fn get_config_handler(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings())
}

/// Handle POST /config - Update any subset of the settings in one step
pub async fn update_config_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> ApiResult {
    let Json(update) = payload.map_err(|rejection| {
        warn!("Rejected config body: {}", rejection.body_text());
        ApiError(rejection.body_text())
    })?;

    let Json(mut response) = run_command(
        &state,
        Command::UpdateSettings(update),
        "Configuration updated and saved".to_string(),
    )
    .await?;
    if response.warning.is_some() {
        response.message = Some("Configuration updated but not saved".to_string());
    }
    Ok(Json(response))
}

/// Handle GET /debug - Compare the settings file with the live settings
pub async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<DebugResponse> {
    let (file_config, file_error) = match state.stored_settings() {
        Ok(settings) => (settings, None),
        Err(e) => (None, Some(e.to_string())),
    };

    Json(DebugResponse {
        settings_file: state.settings_path(),
        config_file_exists: state.settings_file_exists(),
        file_config,
        file_error,
        live_config: state.settings(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime()))
}
