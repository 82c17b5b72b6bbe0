//! Shared timer handle
//!
//! `AppState` owns the single [`TimerState`] behind one exclusive lock. Reads
//! and writes both take the lock, and only for field arithmetic and copies.
//! Projection, formatting and file I/O all happen after it is released.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::{Command, TimerSnapshot, TimerState, DEFAULT_ADJUST_SECONDS};
use crate::{
    clock::Clock,
    error::{StorageError, TimerError},
    progress::{project, ProgressView},
    settings::{Settings, SettingsStore, SettingsUpdate},
};

#[derive(Debug)]
pub struct AppState {
    timer: Mutex<TimerState>,
    clock: Arc<dyn Clock>,
    store: Box<dyn SettingsStore>,
    /// Serializes settings writes so the newest snapshot always lands last
    store_lock: Mutex<()>,
    pub start_time: Instant,
}

impl AppState {
    /// Create the shared state with the timer running from now
    pub fn new(settings: Settings, store: Box<dyn SettingsStore>, clock: Arc<dyn Clock>) -> Self {
        let timer = TimerState::new(settings, clock.now_ms());
        Self {
            timer: Mutex::new(timer),
            clock,
            store,
            store_lock: Mutex::new(()),
            start_time: Instant::now(),
        }
    }

    // A panic can't leave the timer half-written, so a poisoned lock is still usable.
    fn lock_timer(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one command as a single critical section
    pub fn apply(&self, command: Command) -> Result<TimerSnapshot, TimerError> {
        let result = {
            let mut timer = self.lock_timer();
            let now = self.clock.now_ms();
            Self::execute(&mut timer, &command, now).map(|()| timer.snapshot(now))
        };

        match &result {
            Ok(snapshot) => info!(
                "{} applied: elapsed={}s total={}s ends={} paused={}",
                command.name(),
                snapshot.elapsed_seconds,
                snapshot.total_seconds,
                snapshot.num_segments,
                snapshot.paused
            ),
            Err(e) => warn!("{} rejected: {}", command.name(), e),
        }
        result
    }

    fn execute(timer: &mut TimerState, command: &Command, now: u64) -> Result<(), TimerError> {
        match command {
            Command::Reset => timer.reset(now),
            Command::Pause => {
                if !timer.pause(now) {
                    debug!("pause ignored, already paused");
                }
            }
            Command::Resume => {
                if !timer.resume(now) {
                    debug!("resume ignored, already running");
                }
            }
            Command::TogglePause => {
                timer.toggle(now);
            }
            Command::AddTime(seconds) => timer.add_time(*seconds, now),
            Command::SubtractTime(seconds) => timer.subtract_time(*seconds, now),
            Command::SetRemaining(seconds) => timer.set_remaining(*seconds, now),
            Command::SetTotal(seconds) => timer.set_total(*seconds)?,
            Command::SetNumSegments(count) => timer.set_num_segments(*count)?,
            Command::SetMetadata { logo_url, message } => {
                timer.set_metadata(logo_url.as_deref(), message.as_deref())
            }
            Command::UpdateSettings(update) => timer.apply_update(update)?,
        }
        Ok(())
    }

    pub fn reset(&self) -> TimerSnapshot {
        self.apply_infallible(Command::Reset)
    }

    pub fn pause(&self) -> TimerSnapshot {
        self.apply_infallible(Command::Pause)
    }

    pub fn resume(&self) -> TimerSnapshot {
        self.apply_infallible(Command::Resume)
    }

    pub fn toggle_pause(&self) -> TimerSnapshot {
        self.apply_infallible(Command::TogglePause)
    }

    /// Add `seconds` (default one minute) to the elapsed time
    pub fn add_time(&self, seconds: Option<u64>) -> TimerSnapshot {
        self.apply_infallible(Command::AddTime(seconds.unwrap_or(DEFAULT_ADJUST_SECONDS)))
    }

    /// Subtract `seconds` (default one minute), never going below zero
    pub fn subtract_time(&self, seconds: Option<u64>) -> TimerSnapshot {
        self.apply_infallible(Command::SubtractTime(
            seconds.unwrap_or(DEFAULT_ADJUST_SECONDS),
        ))
    }

    pub fn set_remaining(&self, seconds: u64) -> TimerSnapshot {
        self.apply_infallible(Command::SetRemaining(seconds))
    }

    pub fn set_total(&self, seconds: i64) -> Result<TimerSnapshot, TimerError> {
        self.apply(Command::SetTotal(seconds))
    }

    pub fn set_num_segments(&self, count: i64) -> Result<TimerSnapshot, TimerError> {
        self.apply(Command::SetNumSegments(count))
    }

    pub fn set_metadata(&self, logo_url: Option<String>, message: Option<String>) -> TimerSnapshot {
        self.apply_infallible(Command::SetMetadata { logo_url, message })
    }

    pub fn update_settings(&self, update: SettingsUpdate) -> Result<TimerSnapshot, TimerError> {
        self.apply(Command::UpdateSettings(update))
    }

    fn apply_infallible(&self, command: Command) -> TimerSnapshot {
        // Commands without validation can't fail; fall back to a fresh read regardless.
        self.apply(command).unwrap_or_else(|_| self.status())
    }

    /// Current timer state, taken at a single instant
    pub fn status(&self) -> TimerSnapshot {
        let timer = self.lock_timer();
        timer.snapshot(self.clock.now_ms())
    }

    /// Render-ready projection of the current state
    pub fn view(&self) -> ProgressView {
        let snapshot = self.status();
        project(&snapshot)
    }

    pub fn settings(&self) -> Settings {
        self.lock_timer().settings().clone()
    }

    /// Write the current settings to the store.
    ///
    /// The in-memory state stays authoritative if this fails.
    pub fn save_settings(&self) -> Result<(), StorageError> {
        let _guard = self.store_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let settings = self.settings();
        self.store.save(&settings).inspect_err(|e| {
            warn!("Failed to persist settings: {}", e);
        })?;
        debug!("Settings persisted to {}", self.store.path().display());
        Ok(())
    }

    /// Re-read the settings file and apply it. Elapsed time and pause state are kept.
    ///
    /// A missing or invalid file is an error and leaves the current settings alone.
    pub fn reload_settings(&self) -> Result<Settings, StorageError> {
        let loaded = self.store.load()?.ok_or_else(|| StorageError::Missing {
            path: self.store.path().to_path_buf(),
        })?;

        self.lock_timer()
            .replace_settings(loaded.clone())
            .map_err(|reason| StorageError::Invalid {
                path: self.store.path().to_path_buf(),
                reason,
            })?;

        info!("Settings reloaded from {}", self.store.path().display());
        Ok(loaded)
    }

    /// Settings as currently stored on disk, if any
    pub fn stored_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.store.load()
    }

    pub fn settings_path(&self) -> String {
        self.store.path().display().to_string()
    }

    pub fn settings_file_exists(&self) -> bool {
        self.store.exists()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, settings::FileSettingsStore};
    use std::thread;
    use tempfile::{tempdir, TempDir};

    fn state_with(total: u64, segments: u32) -> (Arc<AppState>, Arc<ManualClock>, TempDir) {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(1_000_000));
        let settings = Settings {
            total_seconds: total,
            num_segments: segments,
            ..Settings::default()
        };
        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        let state = Arc::new(AppState::new(settings, Box::new(store), clock.clone()));
        (state, clock, dir)
    }

    #[test]
    fn reset_then_view_is_empty() {
        let (state, clock, _dir) = state_with(7200, 8);
        clock.advance_secs(900);
        state.reset();

        let view = state.view();
        assert_eq!(view.fraction_complete, 0.0);
        assert_eq!(view.current_end, 0);
        assert_eq!(view.fills, vec![0; 8]);
    }

    #[test]
    fn forced_elapsed_projects_partial_end() {
        let (state, _clock, _dir) = state_with(100, 4);
        state.pause();
        state.add_time(Some(37));

        let view = state.view();
        assert_eq!(view.fills, vec![100, 48, 0, 0]);
        assert_eq!(view.current_end, 1);
    }

    #[test]
    fn overtime_is_kept_in_status_and_clamped_in_view() {
        let (state, _clock, _dir) = state_with(100, 4);
        state.pause();
        state.add_time(Some(150));

        assert_eq!(state.status().elapsed_seconds, 150);
        let view = state.view();
        assert_eq!(view.display_elapsed, 100);
        assert_eq!(view.current_end, 3);
        assert_eq!(view.fills, vec![100; 4]);
    }

    #[test]
    fn subtract_past_zero_clamps() {
        let (state, clock, _dir) = state_with(100, 4);
        clock.advance_secs(30);
        assert_eq!(state.subtract_time(None).elapsed_seconds, 0);
    }

    #[test]
    fn invalid_total_is_rejected_without_effect() {
        let (state, _clock, _dir) = state_with(100, 4);
        assert!(matches!(
            state.set_total(0),
            Err(TimerError::InvalidConfig(_))
        ));
        assert_eq!(state.status().total_seconds, 100);
    }

    #[test]
    fn set_remaining_round_trip() {
        let (state, clock, _dir) = state_with(3600, 4);
        clock.advance_ms(12_345);
        state.set_remaining(600);
        assert_eq!(state.status().elapsed_seconds, 3000);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let (state, _clock, _dir) = state_with(7200, 8);
        state.reset();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    state.add_time(Some(60));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.status().elapsed_seconds, 60 * 32);
    }

    #[test]
    fn readers_never_see_torn_snapshots() {
        let (state, _clock, _dir) = state_with(100, 4);
        state.pause();
        state.add_time(Some(40));

        let writer = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for i in 0..500 {
                    let total = if i % 2 == 0 { 200 } else { 100 };
                    state.set_total(total).unwrap();
                }
            })
        };

        for _ in 0..500 {
            let snap = state.status();
            assert_eq!(snap.remaining_seconds, snap.total_seconds - snap.elapsed_seconds);
        }
        writer.join().unwrap();
    }

    #[test]
    fn concurrent_pause_resume_leaves_a_defined_state() {
        let (state, clock, _dir) = state_with(100, 4);
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        state.pause();
                    } else {
                        state.resume();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Clock never moved, so whatever won, elapsed is untouched.
        assert_eq!(state.status().elapsed_seconds, 0);
        clock.advance_secs(5);
        let snap = state.status();
        assert_eq!(snap.elapsed_seconds, if snap.paused { 0 } else { 5 });
    }

    #[test]
    fn settings_persist_and_reload() {
        let (state, _clock, dir) = state_with(100, 4);
        state.set_total(900).unwrap();
        state.save_settings().unwrap();

        let store = FileSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap().unwrap().total_seconds, 900);

        // Edit the file behind the process's back, then reload.
        let edited = Settings {
            total_seconds: 1200,
            num_segments: 5,
            ..Settings::default()
        };
        store.save(&edited).unwrap();
        assert_eq!(state.reload_settings().unwrap(), edited);
        assert_eq!(state.status().num_segments, 5);
    }

    #[test]
    fn storage_failure_keeps_the_in_memory_change() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let clock = Arc::new(ManualClock::new(0));
        let store = FileSettingsStore::new(blocker.join("settings.json"));
        let state = AppState::new(Settings::default(), Box::new(store), clock);

        state.set_num_segments(3).unwrap();
        assert!(state.save_settings().is_err());
        assert_eq!(state.status().num_segments, 3);
    }

    #[test]
    fn metadata_changes_leave_timing_alone() {
        let (state, clock, _dir) = state_with(100, 4);
        clock.advance_secs(20);
        let snap = state.set_metadata(Some(" logo.png ".into()), None);
        assert_eq!(snap.logo_url, "logo.png");
        assert_eq!(snap.elapsed_seconds, 20);
        assert!(!snap.paused);
    }

    #[test]
    fn reload_without_file_is_an_error() {
        let (state, _clock, _dir) = state_with(100, 4);
        let before = state.settings();
        assert!(matches!(
            state.reload_settings(),
            Err(StorageError::Missing { .. })
        ));
        assert_eq!(state.settings(), before);
        assert!(!state.settings_file_exists());
    }

    #[test]
    fn reload_with_invalid_file_keeps_settings() {
        let (state, _clock, dir) = state_with(100, 4);
        std::fs::write(dir.path().join("settings.json"), r#"{"num_ends": 5000}"#).unwrap();
        assert!(matches!(
            state.reload_settings(),
            Err(StorageError::Invalid { .. })
        ));
        assert_eq!(state.status().num_segments, 4);
    }

}
