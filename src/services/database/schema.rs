use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_parent_events_table(conn)?;
    create_calendar_events_table(conn)?;
    create_tasks_table(conn)?;
    run_item_migrations(conn)?;
    create_shared_storage_table(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_parent_events_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS parent_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            tracks TEXT NOT NULL DEFAULT '[\"PRIMARY\"]',
            team_members TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create parent_events table")?;

    Ok(())
}

fn create_calendar_events_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS calendar_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES parent_events(id) ON DELETE CASCADE,
            track TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL,
            tag TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create calendar_events table")?;

    Ok(())
}

fn create_tasks_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES parent_events(id) ON DELETE CASCADE,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            assigned_to TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create tasks table")?;

    Ok(())
}

fn run_item_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "calendar_events",
        "location",
        "ALTER TABLE calendar_events ADD COLUMN location TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "tasks",
        "description",
        "ALTER TABLE tasks ADD COLUMN description TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "tasks",
        "location",
        "ALTER TABLE tasks ADD COLUMN location TEXT",
    )?;

    Ok(())
}

fn create_shared_storage_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS shared_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create shared_storage table")?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calendar_events_event ON calendar_events(event_id, track)",
        [],
    )
    .context("Failed to create calendar_events index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_event ON tasks(event_id)",
        [],
    )
    .context("Failed to create tasks index")?;

    Ok(())
}
