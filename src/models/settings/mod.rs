// Settings module
// Planner configuration read from config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::parent_event::TeamMember;

/// Smallest zoom level any input surface may produce.
pub const MIN_ZOOM: i32 = 64;
/// Largest zoom level any input surface may produce.
pub const MAX_ZOOM: i32 = 310;
pub const DEFAULT_ZOOM: i32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// SQLite file; `None` resolves to the platform data directory.
    pub database_path: Option<PathBuf>,
    pub default_zoom: i32,
    pub zoom_poll_seconds: u64,
    pub default_duration_minutes: i64,
    pub drag_threshold_px: f32,
    /// Owner of the "You" task column.
    pub current_user: TeamMember,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_zoom: DEFAULT_ZOOM,
            zoom_poll_seconds: 30,
            default_duration_minutes: 60,
            drag_threshold_px: 5.0,
            current_user: TeamMember::new("You", "you@localhost"),
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.default_zoom) {
            return Err(format!(
                "default_zoom must be between {} and {}",
                MIN_ZOOM, MAX_ZOOM
            ));
        }
        if self.zoom_poll_seconds == 0 {
            return Err("zoom_poll_seconds must be positive".to_string());
        }
        if self.default_duration_minutes <= 0 {
            return Err("default_duration_minutes must be positive".to_string());
        }
        if !(self.drag_threshold_px >= 0.0) {
            return Err("drag_threshold_px must not be negative".to_string());
        }
        if self.current_user.email.trim().is_empty() {
            return Err("current_user.email must not be empty".to_string());
        }
        Ok(())
    }

    pub fn default_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.default_duration_minutes)
    }

    pub fn zoom_poll_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.zoom_poll_seconds as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PlannerConfig = toml::from_str("default_zoom = 200").unwrap();
        assert_eq!(config.default_zoom, 200);
        assert_eq!(config.zoom_poll_seconds, 30);
        assert_eq!(config.current_user.name, "You");
    }

    #[test]
    fn test_rejects_out_of_range_zoom() {
        let config = PlannerConfig {
            default_zoom: 400,
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let config = PlannerConfig {
            zoom_poll_seconds: 0,
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
