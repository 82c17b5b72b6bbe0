//! Pace Timer - A shared pace clock for multi-end games
//!
//! One timer, shared by a terminal display and an HTTP API. Elapsed time is
//! derived from the wall clock on every read, and every change goes through
//! a single lock so concurrent requests never lose or tear an update.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod progress;
pub mod settings;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{StorageError, TimerError};
pub use progress::{format_clock, project, ProgressView};
pub use settings::{FileSettingsStore, Settings, SettingsStore, SettingsUpdate};
pub use state::{AppState, Command, TimerSnapshot};
pub use utils::signals::shutdown_signal;
