//! Planner configuration loading.
//!
//! Reads `config.toml` from the platform config directory. A missing file
//! means defaults; a malformed file is an error.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::models::settings::PlannerConfig;

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "run_of_show.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "RunOfShow", "Planner")
}

/// Location of `config.toml`, if the platform exposes a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Load the configuration from the default location.
pub fn load() -> Result<PlannerConfig> {
    match default_config_path() {
        Some(path) => load_from(&path),
        None => {
            log::warn!("No config directory available; using default configuration");
            Ok(PlannerConfig::default())
        }
    }
}

/// Load the configuration from `path`, falling back to defaults when absent.
pub fn load_from(path: &Path) -> Result<PlannerConfig> {
    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return Ok(PlannerConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config: PlannerConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow!("Invalid config at {}: {}", path.display(), e))?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Database file to open: the configured path or the platform data directory.
pub fn resolve_database_path(config: &PlannerConfig) -> PathBuf {
    if let Some(path) = &config.database_path {
        return path.clone();
    }

    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
        None => PathBuf::from(DATABASE_FILE),
    }
}
