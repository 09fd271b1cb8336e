//! Zoom-dependent snapping.
//!
//! The quantum shrinks as the grid gets taller: 15 minutes up to zoom 150,
//! 10 minutes up to 250, 5 minutes beyond. Free-mode gestures round to the
//! quantum; grid-mode gestures align to whole hours instead.

use chrono::{DateTime, Duration, Utc};

use super::time_axis::pixel_length;
use crate::utils::date::{ceil_to_hour, floor_to_hour};

/// Base magnetic pull in pixels at zoom 100 with a 15 minute quantum.
pub const BASE_MAGNET_PX: f32 = 12.0;

/// Shortest interval any gesture may produce.
pub fn min_duration() -> Duration {
    Duration::minutes(15)
}

/// How a gesture maps pointer positions to instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Default: round to the zoom quantum.
    Free,
    /// Modifier held: start floors to the hour, end ceils to the hour.
    Grid,
}

impl DragMode {
    pub fn from_modifier(held: bool) -> Self {
        if held {
            DragMode::Grid
        } else {
            DragMode::Free
        }
    }
}

/// Rounding granularity at `zoom`.
pub fn quantum(zoom: i32) -> Duration {
    if zoom <= 150 {
        Duration::minutes(15)
    } else if zoom <= 250 {
        Duration::minutes(10)
    } else {
        Duration::minutes(5)
    }
}

/// Round `instant` to the nearest quantum boundary (half rounds up).
pub fn snap(instant: DateTime<Utc>, zoom: i32) -> DateTime<Utc> {
    let step = quantum(zoom).num_milliseconds();
    let millis = instant.timestamp_millis();
    let remainder = millis.rem_euclid(step);
    let floored = millis - remainder;
    let snapped = if remainder * 2 >= step {
        floored + step
    } else {
        floored
    };
    instant + Duration::milliseconds(snapped - millis)
}

/// Pixel distance under which a free position is pulled onto a boundary.
pub fn magnetic_threshold(zoom: i32) -> f32 {
    let quantum_ratio = quantum(zoom).num_minutes() as f32 / 15.0;
    BASE_MAGNET_PX * (zoom as f32 / 100.0) * quantum_ratio
}

/// Pull `instant` onto the nearest boundary when it is within the magnetic
/// threshold; otherwise keep it at whole-minute precision.
pub fn magnetize(instant: DateTime<Utc>, zoom: i32) -> DateTime<Utc> {
    let boundary = snap(instant, zoom);
    let distance = pixel_length(boundary - instant, zoom).abs();
    if distance <= magnetic_threshold(zoom) {
        boundary
    } else {
        truncate_to_minute(instant)
    }
}

fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    let millis = instant.timestamp_millis();
    instant - Duration::milliseconds(millis.rem_euclid(60_000))
}

/// Resolve a press/release pair into an ordered interval.
///
/// Start and end are reordered first, then aligned according to `mode`, and
/// finally stretched to the minimum duration when they collapse.
pub fn resolve_span(
    a: DateTime<Utc>,
    b: DateTime<Utc>,
    zoom: i32,
    mode: DragMode,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let (start, end) = match mode {
        DragMode::Grid => (floor_to_hour(first), ceil_to_hour(second)),
        DragMode::Free => (snap(first, zoom), snap(second, zoom)),
    };
    (start, enforce_min_duration(start, end))
}

/// Start of a fresh item anchored at the press position.
pub fn anchor_start(press: DateTime<Utc>, zoom: i32, mode: DragMode) -> DateTime<Utc> {
    match mode {
        DragMode::Grid => floor_to_hour(press),
        DragMode::Free => snap(press, zoom),
    }
}

pub fn enforce_min_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    if end - start < min_duration() {
        start + min_duration()
    } else {
        end
    }
}
