// Calendar event model
// Macro activities placed on the parent event's track lanes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// A macro activity on one track of the run of show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    /// Id of the owning [`ParentEvent`](super::parent_event::ParentEvent).
    pub event_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// May be blank right after creation, until the inline editor fills it in.
    pub title: String,
    /// RGB triple as `"r, g, b"`.
    pub color: String,
    pub tag: Option<String>,
    pub track: String,
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    /// Apply every field present in `patch`.
    pub fn apply(&mut self, patch: &CalendarEventPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(tag) = &patch.tag {
            self.tag = tag.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
    }
}

/// Arguments of the create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub event_id: i64,
    pub track: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub color: String,
}

impl NewCalendarEvent {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// `tag` and `location` are doubly optional so an update can clear them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
}

impl CalendarEventPatch {
    pub fn times(interval: Interval) -> Self {
        Self {
            start_time: Some(interval.start),
            end_time: Some(interval.end),
            ..Self::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the tag, or clear it with `None`.
    pub fn tag(tag: Option<String>) -> Self {
        Self {
            tag: Some(tag),
            ..Self::default()
        }
    }

    pub fn location(location: Option<String>) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    pub fn touches_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }
}
