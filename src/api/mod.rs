//! HTTP API module
//!
//! Control endpoints that drive the timer and read endpoints that remote
//! displays poll.

pub mod commands;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/view", get(view_handler))
        .route("/reset", post(reset_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/toggle", post(toggle_handler))
        .route("/add_time", post(add_time_handler))
        .route("/subtract_time", post(subtract_time_handler))
        .route("/set_remaining", post(set_remaining_handler))
        .route("/set_total", post(set_total_handler))
        .route("/set_ends", post(set_ends_handler))
        .route("/config", get(get_config_handler).post(update_config_handler))
        .route("/debug", get(debug_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
