//! Progress projection
//!
//! Pure mapping from a [`TimerSnapshot`] to what a display needs to draw: the
//! clamped clock face, overall fraction, the end the players should be on and
//! how full each end's box is.

use serde::{Deserialize, Serialize};

use crate::state::TimerSnapshot;

/// Render-ready view of the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    /// Raw elapsed time, unclamped
    pub elapsed_seconds: u64,
    /// Elapsed time clamped to the total, for the clock face
    pub display_elapsed: u64,
    pub clock: String,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub fraction_complete: f64,
    pub end_units: f64,
    /// Zero-based index of the end the players should be on
    pub current_end: usize,
    /// Fill percentage (0..=100) of each end
    pub fills: Vec<u8>,
    pub paused: bool,
    pub overtime: bool,
    pub logo_url: String,
    pub message: String,
}

pub fn project(snapshot: &TimerSnapshot) -> ProgressView {
    let total = snapshot.total_seconds.max(1);
    let segments = snapshot.num_segments.max(1) as usize;

    let display_elapsed = snapshot.elapsed_seconds.min(snapshot.total_seconds);
    let fraction_complete = (snapshot.elapsed_seconds as f64 / total as f64).clamp(0.0, 1.0);
    let end_units = fraction_complete * segments as f64;

    let full = end_units.floor() as usize;
    let partial = ((end_units - end_units.floor()) * 100.0).round() as u8;
    let fills = (0..segments)
        .map(|idx| match idx.cmp(&full) {
            std::cmp::Ordering::Less => 100,
            std::cmp::Ordering::Equal => partial.min(100),
            std::cmp::Ordering::Greater => 0,
        })
        .collect();

    ProgressView {
        elapsed_seconds: snapshot.elapsed_seconds,
        display_elapsed,
        clock: format_clock(display_elapsed),
        remaining_seconds: snapshot.remaining_seconds,
        total_seconds: snapshot.total_seconds,
        fraction_complete,
        end_units,
        current_end: full.min(segments - 1),
        fills,
        paused: snapshot.paused,
        overtime: snapshot.is_overtime(),
        logo_url: snapshot.logo_url.clone(),
        message: snapshot.message.clone(),
    }
}

/// Format seconds as `H:MM:SS`, or `MM:SS` under an hour
pub fn format_clock(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(elapsed: u64, total: u64, segments: u32) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_seconds: elapsed,
            remaining_seconds: total.saturating_sub(elapsed),
            total_seconds: total,
            num_segments: segments,
            paused: false,
            logo_url: String::new(),
            message: String::new(),
        }
    }

    #[test]
    fn fresh_timer_is_empty() {
        let view = project(&snapshot(0, 7200, 8));
        assert_eq!(view.fraction_complete, 0.0);
        assert_eq!(view.current_end, 0);
        assert_eq!(view.fills, vec![0; 8]);
        assert_eq!(view.clock, "00:00");
    }

    #[test]
    fn partial_end_fill() {
        let view = project(&snapshot(37, 100, 4));
        assert!((view.fraction_complete - 0.37).abs() < 1e-9);
        assert!((view.end_units - 1.48).abs() < 1e-9);
        assert_eq!(view.fills, vec![100, 48, 0, 0]);
        assert_eq!(view.current_end, 1);
        assert!(!view.overtime);
    }

    #[test]
    fn overtime_is_clamped_on_the_face() {
        let view = project(&snapshot(150, 100, 4));
        assert_eq!(view.display_elapsed, 100);
        assert_eq!(view.clock, "01:40");
        assert_eq!(view.elapsed_seconds, 150);
        assert_eq!(view.fraction_complete, 1.0);
        assert_eq!(view.current_end, 3);
        assert_eq!(view.fills, vec![100; 4]);
        assert!(view.overtime);
    }

    #[test]
    fn exactly_complete_fills_everything() {
        let view = project(&snapshot(100, 100, 4));
        assert_eq!(view.current_end, 3);
        assert_eq!(view.fills, vec![100; 4]);
        assert!(!view.overtime);
    }

    #[test]
    fn single_end() {
        let view = project(&snapshot(30, 120, 1));
        assert_eq!(view.fills, vec![25]);
        assert_eq!(view.current_end, 0);
    }

    #[test]
    fn fraction_is_monotonic_in_elapsed() {
        let mut last = -1.0;
        for elapsed in 0..=400 {
            let view = project(&snapshot(elapsed, 300, 7));
            assert!(view.fraction_complete >= last);
            assert!((0.0..=1.0).contains(&view.fraction_complete));
            assert!(view.fills.iter().all(|&f| f <= 100));
            last = view.fraction_complete;
        }
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3600), "1:00:00");
        assert_eq!(format_clock(7261), "2:01:01");
    }
}
