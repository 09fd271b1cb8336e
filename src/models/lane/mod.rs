//! Lane identifiers: one vertical strip of the grid.
//!
//! Calendar events live on track lanes, tasks live on per-person columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of item a lane holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    CalendarEvent,
    Task,
}

/// A single lane of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneId {
    /// A track of the event schedule, by track name.
    Track(String),
    /// A task column, keyed by the assignee's email.
    Person(String),
}

impl LaneId {
    pub fn target_kind(&self) -> TargetKind {
        match self {
            LaneId::Track(_) => TargetKind::CalendarEvent,
            LaneId::Person(_) => TargetKind::Task,
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneId::Track(name) => write!(f, "track:{}", name),
            LaneId::Person(email) => write!(f, "person:{}", email),
        }
    }
}

/// Reference to one schedulable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRef {
    CalendarEvent(i64),
    Task(i64),
}

impl ItemRef {
    pub fn id(&self) -> i64 {
        match self {
            ItemRef::CalendarEvent(id) | ItemRef::Task(id) => *id,
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            ItemRef::CalendarEvent(_) => TargetKind::CalendarEvent,
            ItemRef::Task(_) => TargetKind::Task,
        }
    }
}
