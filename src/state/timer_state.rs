//! Timer state machine
//!
//! Elapsed time is never ticked forward. It is derived on every read from the
//! accumulated base plus the wall-clock time since the last resume, so every
//! operation here takes the current time explicitly.

use serde::{Deserialize, Serialize};

use crate::{
    error::TimerError,
    settings::{validate_segments, validate_total, Settings, SettingsUpdate},
};

/// Default step for add/subtract when the caller gives none
pub const DEFAULT_ADJUST_SECONDS: u64 = 60;

/// Whether elapsed time is currently accumulating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Accumulating since `since_ms`
    Running { since_ms: u64 },
    Paused,
}

/// Consistent copy of the timer taken at a single instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Raw elapsed time. May exceed `total_seconds` when running over.
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    #[serde(rename = "num_ends")]
    pub num_segments: u32,
    pub paused: bool,
    pub logo_url: String,
    pub message: String,
}

impl TimerSnapshot {
    pub fn is_overtime(&self) -> bool {
        self.elapsed_seconds > self.total_seconds
    }
}

#[derive(Debug, Clone)]
pub struct TimerState {
    /// Elapsed time banked before the current run
    base_ms: u64,
    run: RunState,
    settings: Settings,
}

impl TimerState {
    /// Create a timer that starts running at `now_ms`
    pub fn new(settings: Settings, now_ms: u64) -> Self {
        Self {
            base_ms: 0,
            run: RunState::Running { since_ms: now_ms },
            settings,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn is_paused(&self) -> bool {
        self.run == RunState::Paused
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.run {
            RunState::Running { since_ms } => {
                self.base_ms.saturating_add(now_ms.saturating_sub(since_ms))
            }
            RunState::Paused => self.base_ms,
        }
    }

    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1000
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.base_ms = 0;
        self.run = RunState::Running { since_ms: now_ms };
    }

    /// Returns false when the timer was already paused.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.is_paused() {
            return false;
        }
        self.base_ms = self.elapsed_ms(now_ms);
        self.run = RunState::Paused;
        true
    }

    /// Returns false when the timer was already running.
    pub fn resume(&mut self, now_ms: u64) -> bool {
        if !self.is_paused() {
            return false;
        }
        self.run = RunState::Running { since_ms: now_ms };
        true
    }

    /// Flip between paused and running. Returns true if the timer is now paused.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.is_paused() {
            self.resume(now_ms);
            false
        } else {
            self.pause(now_ms);
            true
        }
    }

    pub fn add_time(&mut self, seconds: u64, now_ms: u64) {
        let elapsed = self
            .elapsed_ms(now_ms)
            .saturating_add(seconds.saturating_mul(1000));
        self.rebase(elapsed, now_ms);
    }

    /// Floors at zero.
    pub fn subtract_time(&mut self, seconds: u64, now_ms: u64) {
        let elapsed = self
            .elapsed_ms(now_ms)
            .saturating_sub(seconds.saturating_mul(1000));
        self.rebase(elapsed, now_ms);
    }

    /// Set elapsed so that `seconds` remain on the clock. Floors at zero and
    /// leaves the total alone.
    pub fn set_remaining(&mut self, seconds: u64, now_ms: u64) {
        let elapsed = self.settings.total_seconds.saturating_sub(seconds);
        self.rebase(elapsed.saturating_mul(1000), now_ms);
    }

    /// Elapsed time is kept as-is, so a shorter total can put the timer into overtime.
    pub fn set_total(&mut self, seconds: i64) -> Result<(), TimerError> {
        self.settings.total_seconds = validate_total(seconds)?;
        Ok(())
    }

    pub fn set_num_segments(&mut self, count: i64) -> Result<(), TimerError> {
        self.settings.num_segments = validate_segments(count)?;
        Ok(())
    }

    pub fn set_metadata(&mut self, logo_url: Option<&str>, message: Option<&str>) {
        if let Some(logo_url) = logo_url {
            self.settings.logo_url = logo_url.trim().to_string();
        }
        if let Some(message) = message {
            self.settings.message = message.trim().to_string();
        }
    }

    /// Apply every field of `update` or none of them.
    pub fn apply_update(&mut self, update: &SettingsUpdate) -> Result<(), TimerError> {
        if update.is_empty() {
            return Err(TimerError::invalid("No valid configuration fields provided"));
        }

        let total = update.total_seconds.map(validate_total).transpose()?;
        let segments = update.num_ends.map(validate_segments).transpose()?;

        if let Some(total) = total {
            self.settings.total_seconds = total;
        }
        if let Some(segments) = segments {
            self.settings.num_segments = segments;
        }
        self.set_metadata(update.logo_url.as_deref(), update.message.as_deref());
        Ok(())
    }

    /// Swap in a whole settings snapshot without touching elapsed time.
    pub fn replace_settings(&mut self, settings: Settings) -> Result<(), TimerError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn snapshot(&self, now_ms: u64) -> TimerSnapshot {
        let elapsed_seconds = self.elapsed_seconds(now_ms);
        TimerSnapshot {
            elapsed_seconds,
            remaining_seconds: self.settings.total_seconds.saturating_sub(elapsed_seconds),
            total_seconds: self.settings.total_seconds,
            num_segments: self.settings.num_segments,
            paused: self.is_paused(),
            logo_url: self.settings.logo_url.clone(),
            message: self.settings.message.clone(),
        }
    }

    fn rebase(&mut self, elapsed_ms: u64, now_ms: u64) {
        self.base_ms = elapsed_ms;
        if let RunState::Running { .. } = self.run {
            self.run = RunState::Running { since_ms: now_ms };
        }
    }
}
