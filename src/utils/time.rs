//! Block time formatting

use chrono::{TimeZone, Utc};

/// Convert a Unix block time to an RFC 3339 UTC string
///
/// Returns "unknown" for transactions without an indexed block time.
///
/// # Examples
/// ```
/// use burn_history_scanner::utils::time::format_block_time;
/// assert_eq!(format_block_time(Some(1704067200)), "2024-01-01 00:00:00 UTC");
/// assert_eq!(format_block_time(None), "unknown");
/// ```
pub fn format_block_time(block_time: Option<i64>) -> String {
    block_time
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format elapsed seconds into human-readable time
pub fn format_elapsed_time(elapsed_secs: f64) -> String {
    if elapsed_secs < 60.0 {
        format!("{:.1}s", elapsed_secs)
    } else if elapsed_secs < 3600.0 {
        let minutes = (elapsed_secs / 60.0).floor();
        let seconds = elapsed_secs % 60.0;
        format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
    } else {
        let hours = (elapsed_secs / 3600.0).floor();
        let remaining = elapsed_secs % 3600.0;
        let minutes = (remaining / 60.0).floor();
        let seconds = remaining % 60.0;
        format!(
            "{}h {}m {:.0}s ({:.1}s)",
            hours, minutes, seconds, elapsed_secs
        )
    }
}
