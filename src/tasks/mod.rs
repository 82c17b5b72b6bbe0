//! Background tasks module
//!
//! Tasks that run alongside the HTTP server.

pub mod display;

// Re-export main functions
pub use display::{display_task, render_line};
