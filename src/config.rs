//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{
    error::TimerError,
    settings::{validate_segments, validate_total, Settings, DEFAULT_SETTINGS_FILE},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pace-timer")]
#[command(about = "A shared pace clock for multi-end games")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, env = "PACE_PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Where settings are persisted between runs
    #[arg(long, env = "PACE_CONFIG_FILE", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings_file: PathBuf,

    /// Override the total duration in seconds
    #[arg(long, env = "PACE_TOTAL_SECONDS")]
    pub total_seconds: Option<i64>,

    /// Override the number of ends
    #[arg(long, env = "PACE_NUM_ENDS")]
    pub num_ends: Option<i64>,

    /// Override the logo shown on displays
    #[arg(long, env = "PACE_LOGO_URL")]
    pub logo_url: Option<String>,

    /// Draw the pace display in this terminal
    #[arg(short, long)]
    pub display: bool,

    /// Display refresh interval in milliseconds
    #[arg(long, default_value = "500")]
    pub refresh_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Layer command-line and environment overrides on top of stored settings
    pub fn apply_overrides(&self, mut settings: Settings) -> Result<Settings, TimerError> {
        if let Some(total) = self.total_seconds {
            settings.total_seconds = validate_total(total)?;
        }
        if let Some(ends) = self.num_ends {
            settings.num_segments = validate_segments(ends)?;
        }
        if let Some(logo_url) = &self.logo_url {
            settings.logo_url = logo_url.trim().to_string();
        }
        Ok(settings)
    }
}
