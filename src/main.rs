// Run-of-show planner
// Main entry point

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use std::rc::Rc;

use run_of_show::models::parent_event::{ParentEvent, TeamMember};
use run_of_show::models::settings::PlannerConfig;
use run_of_show::services::config;
use run_of_show::services::database::Database;
use run_of_show::services::persistence::SqlitePersistence;
use run_of_show::services::schedule::ScheduleStore;
use run_of_show::services::storage::SqliteStorage;
use run_of_show::ui_egui::planner::Planner;
use run_of_show::ui_egui::zoom::ZoomModel;
use run_of_show::ui_egui::PlannerApp;
use run_of_show::utils::clock::SystemClock;
use run_of_show::utils::date::floor_to_hour;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting run-of-show planner");

    let config = config::load()?;
    let database = open_database(&config)?;
    let persistence = SqlitePersistence::new(database.connection());
    let event_id = ensure_parent_event(&persistence, &config)?;

    let store = ScheduleStore::load(persistence, event_id)?;
    let zoom = ZoomModel::new(
        Box::new(SqliteStorage::new(database.connection())),
        Rc::new(SystemClock),
        config.default_zoom,
        config.zoom_poll_interval(),
    );
    let planner = Planner::new(store, zoom, &config);
    let app = PlannerApp::new(planner);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Run of Show",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("Planner window failed: {}", e))
}

/// The database lives for the whole process; services borrow its connection.
fn open_database(config: &PlannerConfig) -> Result<&'static Database> {
    let path = config::resolve_database_path(config);
    let db = Database::open_file(&path)?;
    db.initialize_schema()
        .context("Failed to initialize database schema")?;
    log::info!("Using database at {}", path.display());
    Ok(Box::leak(Box::new(db)))
}

/// Open the most recent parent event, creating a sample one on first run.
fn ensure_parent_event(persistence: &SqlitePersistence, config: &PlannerConfig) -> Result<i64> {
    if let Some(existing) = persistence.latest_parent_event()? {
        return Ok(existing.id);
    }

    let start = floor_to_hour(Utc::now()) + Duration::hours(1);
    let sample = ParentEvent::new(
        "Sample Event",
        start,
        start + Duration::hours(9),
        vec!["Main Stage".to_string(), "Workshop Room".to_string()],
        vec![
            config.current_user.clone(),
            TeamMember::new("Stage Manager", "stage@localhost"),
        ],
    )
    .map_err(|e| anyhow!(e))?;

    let created = persistence.create_parent_event(&sample)?;
    log::info!("Created sample event {}", created.id);
    Ok(created.id)
}
