use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a proposed mutation of the run of show was not applied.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{start} - {end} falls outside the event window {window_start} - {window_end}")]
    OutOfBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },

    #[error("items may last at most 23.99 hours, this one lasts {duration_minutes} minutes")]
    TooLong { duration_minutes: i64 },

    #[error("end time must be after start time")]
    InvalidInterval,

    #[error("overlaps \"{title}\" on the same track")]
    Overlap { conflicting_id: i64, title: String },

    #[error("track \"{0}\" does not belong to this event")]
    UnknownTrack(String),

    #[error("no item with id {0}")]
    NotFound(i64),

    #[error("persistence service failed: {0:#}")]
    Persistence(anyhow::Error),
}

impl ScheduleError {
    /// Bounds and overlap rejections block the user with a message; service
    /// failures are only logged.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ScheduleError::Persistence(_) | ScheduleError::NotFound(_))
    }
}
