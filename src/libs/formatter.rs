//! Formatting helpers for clocked time.

/// Formats seconds as `#h #m`, dropping leftover seconds.
///
/// ```rust
/// use keka_clicker::libs::formatter::format_clocked_time;
///
/// assert_eq!(format_clocked_time(8 * 3600 + 5 * 60 + 59), "8h 5m");
/// ```
pub fn format_clocked_time(seconds: u64) -> String {
    let total_minutes = seconds / 60;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
