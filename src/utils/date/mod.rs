// Date utility functions
// All arithmetic happens in UTC; there is no timezone conversion anywhere.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Truncate an instant to the start of its hour.
pub fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(Duration::hours(1))
        .unwrap_or(instant)
}

/// Round an instant up to the next whole hour (unchanged when already aligned).
pub fn ceil_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    let floored = floor_to_hour(instant);
    if floored == instant {
        instant
    } else {
        floored + Duration::hours(1)
    }
}

/// Signed number of hours from `origin` to `instant`, with millisecond precision.
pub fn hours_between(instant: DateTime<Utc>, origin: DateTime<Utc>) -> f64 {
    (instant - origin).num_milliseconds() as f64 / 3_600_000.0
}

/// Duration from a fractional number of hours, rounded to the millisecond.
pub fn duration_from_hours(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Short `HH:MM` label used on hour cells and item blocks.
pub fn format_clock(instant: DateTime<Utc>) -> String {
    instant.format("%H:%M").to_string()
}

/// `HH:MM - HH:MM` label for an interval.
pub fn format_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("{} - {}", format_clock(start), format_clock(end))
}
