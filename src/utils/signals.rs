//! Signal handling for graceful shutdown and settings reload

use std::sync::Arc;

use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

use crate::state::AppState;

/// Wait for SIGTERM or SIGINT. SIGHUP re-reads the settings file in between.
pub async fn shutdown_signal(state: Arc<AppState>) {
    let mut signals = match Signals::new([SIGTERM, SIGINT, SIGHUP]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install signal handlers ({}), falling back to Ctrl-C", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            return;
        }
    };

    while let Some(signal) = signals.next().await {
        if signal != SIGHUP {
            info!("Received signal: {}", signal);
            break;
        }

        info!("SIGHUP received, reloading settings");
        let state = Arc::clone(&state);
        match tokio::task::spawn_blocking(move || state.reload_settings()).await {
            Ok(Ok(settings)) => info!(
                "Settings reloaded: total={}s ends={}",
                settings.total_seconds, settings.num_segments
            ),
            Ok(Err(e)) => warn!("Settings reload failed, keeping current settings: {}", e),
            Err(e) => warn!("Settings reload task failed: {}", e),
        }
    }
}
