//! Human-readable time formatting
//!
//! Provides consistent time display for set durations and upload ETAs.

use std::time::Duration;

use crate::models::UNKNOWN_DURATION;

/// ETA text shown once a transfer has reached 100%
pub const ETA_DONE: &str = "done";

/// Format a playback length as `M:SS`.
///
/// Minutes are not wrapped into hours, so a two hour set renders as `120:00`.
/// Fractional seconds are truncated. Negative lengths clamp to zero; non-finite
/// lengths (streams report infinity) cannot be displayed and yield `--`.
///
/// # Examples
///
/// ```
/// use djsite_common::human_time::format_set_duration;
///
/// assert_eq!(format_set_duration(125.0), "2:05");
/// assert_eq!(format_set_duration(59.9), "0:59");
/// assert_eq!(format_set_duration(3725.0), "62:05");
/// assert_eq!(format_set_duration(f64::INFINITY), "--");
/// ```
pub fn format_set_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        return UNKNOWN_DURATION.to_string();
    }

    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Transfer completion as an integer percentage, rounded to nearest.
///
/// An empty transfer is complete by definition.
///
/// # Examples
///
/// ```
/// use djsite_common::human_time::transfer_percent;
///
/// assert_eq!(transfer_percent(0, 200), 0);
/// assert_eq!(transfer_percent(1, 3), 33);
/// assert_eq!(transfer_percent(2, 3), 67);
/// assert_eq!(transfer_percent(0, 0), 100);
/// ```
pub fn transfer_percent(transferred: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (transferred.min(total) as f64 / total as f64 * 100.0).round();
    pct as u8
}

/// Estimate remaining transfer time from the completion rate so far.
///
/// - `--` before any progress is known (no elapsed time or 0%)
/// - `done` at 100%
/// - `M:SS` otherwise, assuming the average rate holds
///
/// # Examples
///
/// ```
/// use djsite_common::human_time::format_eta;
/// use std::time::Duration;
///
/// assert_eq!(format_eta(50, Some(Duration::from_secs(10))), "0:10");
/// assert_eq!(format_eta(100, Some(Duration::from_secs(10))), "done");
/// assert_eq!(format_eta(0, Some(Duration::from_secs(10))), "--");
/// assert_eq!(format_eta(50, None), "--");
/// ```
pub fn format_eta(percent: u8, elapsed: Option<Duration>) -> String {
    if percent >= 100 {
        return ETA_DONE.to_string();
    }
    let Some(elapsed) = elapsed else {
        return UNKNOWN_DURATION.to_string();
    };
    if percent == 0 {
        return UNKNOWN_DURATION.to_string();
    }

    let elapsed_secs = elapsed.as_secs_f64();
    if elapsed_secs <= 0.0 {
        return "0:00".to_string();
    }

    let rate = f64::from(percent) / elapsed_secs;
    let remaining = (f64::from(100 - percent) / rate).round() as u64;
    format!("{}:{:02}", remaining / 60, remaining % 60)
}
