//! Vertical coordinate system of the grid.
//!
//! One hour spans `zoom + 1` pixels. The `+ 1` keeps a zoom of 0 visible at
//! 1 px/hour; every conversion below uses the same scale so positions and
//! instants always agree.

use chrono::{DateTime, Duration, Utc};

use crate::utils::date::{duration_from_hours, hours_between};

/// Pixels covered by one hour at `zoom`.
pub fn pixels_per_hour(zoom: i32) -> f64 {
    zoom as f64 + 1.0
}

/// Offset of `instant` below `origin`, in pixels.
pub fn pixel_offset(instant: DateTime<Utc>, origin: DateTime<Utc>, zoom: i32) -> f32 {
    (hours_between(instant, origin) * pixels_per_hour(zoom)) as f32
}

/// Instant shown `offset` pixels below `origin`.
pub fn instant_at(offset: f32, origin: DateTime<Utc>, zoom: i32) -> DateTime<Utc> {
    origin + duration_from_hours(offset as f64 / pixels_per_hour(zoom))
}

/// Height in pixels of a span of time.
pub fn pixel_length(duration: Duration, zoom: i32) -> f32 {
    (duration.num_milliseconds() as f64 / 3_600_000.0 * pixels_per_hour(zoom)) as f32
}

/// A time axis pinned to one origin and zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub origin: DateTime<Utc>,
    pub zoom: i32,
}

impl TimeAxis {
    pub fn new(origin: DateTime<Utc>, zoom: i32) -> Self {
        Self { origin, zoom }
    }

    pub fn y_for(&self, instant: DateTime<Utc>) -> f32 {
        pixel_offset(instant, self.origin, self.zoom)
    }

    pub fn instant_for(&self, y: f32) -> DateTime<Utc> {
        instant_at(y, self.origin, self.zoom)
    }

    pub fn height_of(&self, duration: Duration) -> f32 {
        pixel_length(duration, self.zoom)
    }
}
