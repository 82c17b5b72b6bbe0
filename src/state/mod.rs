//! State management module
//!
//! The timer state machine, the typed commands that drive it, and the
//! lock-guarded handle the rest of the process shares.

pub mod app_state;
pub mod command;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use command::Command;
pub use timer_state::{RunState, TimerSnapshot, TimerState, DEFAULT_ADJUST_SECONDS};
