//! Pace Timer - A shared pace clock for multi-end games
//!
//! This is the main entry point for the pace-timer application.

use std::{sync::Arc, time::Duration};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pace_timer::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    settings::{FileSettingsStore, Settings, SettingsStore},
    state::AppState,
    tasks::display_task,
    utils::shutdown_signal,
};

/// Lower bound on the display refresh interval
const MIN_REFRESH_MS: u64 = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout belongs to the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(format!("pace_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pace-timer v{}", env!("CARGO_PKG_VERSION"));

    let store = FileSettingsStore::new(&config.settings_file);
    let stored = match store.load() {
        Ok(Some(settings)) => {
            info!("Loaded settings from {}", config.settings_file.display());
            settings
        }
        Ok(None) => {
            info!("No settings file at {}, using defaults", config.settings_file.display());
            Settings::default()
        }
        Err(e) => {
            warn!("Could not load settings, using defaults: {}", e);
            Settings::default()
        }
    };
    let settings = config
        .apply_overrides(stored)
        .context("invalid command-line or environment settings")?;

    info!(
        "Configuration: host={}, port={}, total={}s, ends={}",
        config.host, config.port, settings.total_seconds, settings.num_segments
    );

    // Create application state; the timer starts running now
    let state = Arc::new(AppState::new(settings, Box::new(store), Arc::new(SystemClock)));

    if config.display {
        let display_state = Arc::clone(&state);
        let refresh = Duration::from_millis(config.refresh_ms.max(MIN_REFRESH_MS));
        tokio::spawn(async move {
            display_task(display_state, refresh).await;
        });
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status         - Raw timer state");
    info!("  GET  /view           - Progress for displays");
    info!("  POST /reset | /pause | /resume | /toggle");
    info!("  POST /add_time | /subtract_time [?seconds=N]");
    info!("  POST /set_remaining | /set_total ?seconds=S | ?time=H:MM:SS");
    info!("  POST /set_ends?count=N");
    info!("  GET|POST /config, GET /debug, GET /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal(Arc::clone(&state)) => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
