//! Checks applied before any mutation reaches the persistence service.

use chrono::Duration;

use super::error::ScheduleError;
use crate::models::calendar_event::CalendarEvent;
use crate::models::interval::Interval;

/// 23.99 hours.
pub const MAX_DURATION_SECONDS: i64 = 86_364;

pub fn max_duration() -> Duration {
    Duration::seconds(MAX_DURATION_SECONDS)
}

/// The interval must be non-empty, no longer than the maximum duration and
/// inside the parent window.
pub fn check_interval(interval: &Interval, window: &Interval) -> Result<(), ScheduleError> {
    if interval.end <= interval.start {
        return Err(ScheduleError::InvalidInterval);
    }

    if interval.duration() > max_duration() {
        return Err(ScheduleError::TooLong {
            duration_minutes: interval.duration().num_minutes(),
        });
    }

    if !window.encloses(interval) {
        return Err(ScheduleError::OutOfBounds {
            start: interval.start,
            end: interval.end,
            window_start: window.start,
            window_end: window.end,
        });
    }

    Ok(())
}

/// Calendar events on one track may not overlap. `exclude` skips the item
/// being edited.
pub fn check_track_overlap<'a>(
    interval: &Interval,
    track: &str,
    existing: impl IntoIterator<Item = &'a CalendarEvent>,
    exclude: Option<i64>,
) -> Result<(), ScheduleError> {
    let conflict = existing.into_iter().find(|event| {
        event.track == track && Some(event.id) != exclude && event.interval().overlaps(interval)
    });

    match conflict {
        Some(event) => Err(ScheduleError::Overlap {
            conflicting_id: event.id,
            title: event.title.clone(),
        }),
        None => Ok(()),
    }
}
