//! Terminal pace display
//!
//! Polls the timer at a fixed cadence and redraws a single status line. It
//! only ever reads; all control goes through the HTTP API.

use std::{sync::Arc, time::Duration};
use tokio::{
    io::{stdout, AsyncWriteExt, Stdout},
    time::{interval, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::{progress::ProgressView, state::AppState};

/// Characters per end box
const CELL_WIDTH: usize = 6;

/// Background task that redraws the pace line every `refresh`
pub async fn display_task(state: Arc<AppState>, refresh: Duration) {
    info!("Starting terminal display, refresh every {:?}", refresh);

    let mut ticker = interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut out = stdout();
    let mut last = String::new();

    loop {
        ticker.tick().await;

        let line = render_line(&state.view(), CELL_WIDTH);
        if line == last {
            continue;
        }

        if let Err(e) = write_frame(&mut out, &line).await {
            warn!("Terminal display stopped: {}", e);
            return;
        }
        last = line;
    }
}

async fn write_frame(out: &mut Stdout, line: &str) -> std::io::Result<()> {
    // Return to column 0 and clear the previous frame.
    out.write_all(format!("\r\x1b[2K{}", line).as_bytes()).await?;
    out.flush().await
}

/// Draw one line: a box per end, the end to be on, and the clock
pub fn render_line(view: &ProgressView, cell_width: usize) -> String {
    let cells: Vec<String> = view
        .fills
        .iter()
        .map(|&fill| {
            let filled = (usize::from(fill) * cell_width + 50) / 100;
            format!("{}{}", "#".repeat(filled), " ".repeat(cell_width - filled))
        })
        .collect();

    let mut line = format!(
        "[{}] end {}/{}  {}",
        cells.join("|"),
        view.current_end + 1,
        view.fills.len(),
        view.clock
    );
    if view.paused {
        line.push_str("  (paused)");
    }
    line
}
