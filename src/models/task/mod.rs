// Task model
// Granular work items placed on per-person columns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;
use super::parent_event::TeamMember;

/// A work item assigned to one or more team members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub event_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Vec<TeamMember>,
    pub location: Option<String>,
}

impl Task {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    pub fn is_assigned_to(&self, email: &str) -> bool {
        self.assigned_to.iter().any(|m| m.email == email)
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
    }
}

/// Arguments of the create call. New tasks start untitled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub event_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub initial_assignee: TeamMember,
}

impl NewTask {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
}

impl TaskPatch {
    pub fn times(interval: Interval) -> Self {
        Self {
            start_time: Some(interval.start),
            end_time: Some(interval.end),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(description: Option<String>) -> Self {
        Self {
            description: Some(description),
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task {
            id: 3,
            event_id: 1,
            start_time: Utc.with_ymd_and_hms(2025, 6, 14, 8, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 14, 8, 30, 0).unwrap(),
            title: "Badge printing".into(),
            description: None,
            assigned_to: vec![TeamMember::new("Ana", "ana@example.com")],
            location: Some("Lobby".into()),
        }
    }

    #[test]
    fn test_is_assigned_to() {
        let task = sample();
        assert!(task.is_assigned_to("ana@example.com"));
        assert!(!task.is_assigned_to("bo@example.com"));
    }

    #[test]
    fn test_apply_patch_clears_location() {
        let mut task = sample();
        task.apply(&TaskPatch {
            location: Some(None),
            description: Some(Some("200 badges".into())),
            ..TaskPatch::default()
        });
        assert_eq!(task.location, None);
        assert_eq!(task.description.as_deref(), Some("200 badges"));
        assert_eq!(task.title, "Badge printing");
    }

    #[test]
    fn test_description_patch_leaves_times_alone() {
        let patch = TaskPatch::description(Some("Bring the lanyards".into()));
        assert!(!patch.touches_times());

        let mut task = sample();
        task.apply(&patch);
        task.apply(&TaskPatch::location(None));
        assert_eq!(task.description.as_deref(), Some("Bring the lanyards"));
        assert_eq!(task.location, None);
    }

    #[test]
    fn test_deserializes_assignees() {
        let json = r#"{
            "id": 9, "eventId": 1,
            "startTime": "2025-06-14T08:00:00Z", "endTime": "2025-06-14T09:00:00Z",
            "title": "Setup", "description": null,
            "assignedTo": [{"name": "Bo", "email": "bo@example.com"}],
            "location": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.is_assigned_to("bo@example.com"));
    }
}
