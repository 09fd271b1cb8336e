// Parent event model
// Owns the time window and the track list every child item must respect

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Reserved track name that every parent event carries.
pub const PRIMARY_TRACK: &str = "PRIMARY";

/// A person on the organising team; tasks are assigned to team members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// The event being planned. Child items must lie within `[start_time, end_time]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentEvent {
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Ordered track names; always contains [`PRIMARY_TRACK`].
    pub tracks: Vec<String>,
    pub team_members: Vec<TeamMember>,
}

impl ParentEvent {
    /// Create a parent event, checking the window and normalising the tracks.
    ///
    /// The primary track is inserted at the front when the caller omits it.
    pub fn new(
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        tracks: Vec<String>,
        team_members: Vec<TeamMember>,
    ) -> Result<Self, String> {
        let event = Self {
            id: 0,
            name: name.into(),
            start_time,
            end_time,
            tracks: normalize_tracks(tracks),
            team_members,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.end_time <= self.start_time {
            return Err("Event end time must be after start time".to_string());
        }
        if !self.tracks.iter().any(|t| t == PRIMARY_TRACK) {
            return Err(format!("Event must include the {} track", PRIMARY_TRACK));
        }
        Ok(())
    }

    /// The window every child item must fit in.
    pub fn window(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    pub fn has_track(&self, track: &str) -> bool {
        self.tracks.iter().any(|t| t == track)
    }

    pub fn member_by_email(&self, email: &str) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.email == email)
    }
}

/// Drop blank and duplicate names and make sure the primary track leads.
pub fn normalize_tracks(tracks: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tracks.len() + 1);
    for track in tracks {
        let track = track.trim().to_string();
        if !track.is_empty() && !normalized.contains(&track) {
            normalized.push(track);
        }
    }
    if !normalized.iter().any(|t| t == PRIMARY_TRACK) {
        normalized.insert(0, PRIMARY_TRACK.to_string());
    }
    normalized
}
