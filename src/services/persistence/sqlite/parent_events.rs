use super::shared::{format_utc, from_json_column, to_json_column, to_utc_datetime};
use super::SqlitePersistence;
use crate::models::parent_event::ParentEvent;
use anyhow::{anyhow, Context, Result};
use rusqlite::{self, params, Row};

const PARENT_COLUMNS: &str = "id, name, start_time, end_time, tracks, team_members";

fn row_to_parent_event(row: &Row) -> rusqlite::Result<ParentEvent> {
    Ok(ParentEvent {
        id: row.get(0)?,
        name: row.get(1)?,
        start_time: to_utc_datetime(row.get(2)?)?,
        end_time: to_utc_datetime(row.get(3)?)?,
        tracks: from_json_column(row.get(4)?)?,
        team_members: from_json_column(row.get(5)?)?,
    })
}

impl<'a> SqlitePersistence<'a> {
    /// Store a new parent event and return it with its assigned id.
    pub fn create_parent_event(&self, event: &ParentEvent) -> Result<ParentEvent> {
        event.validate().map_err(|e| anyhow!(e))?;

        self.conn
            .execute(
                "INSERT INTO parent_events (name, start_time, end_time, tracks, team_members)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    event.name,
                    format_utc(event.start_time),
                    format_utc(event.end_time),
                    to_json_column(&event.tracks)?,
                    to_json_column(&event.team_members)?,
                ],
            )
            .context("Failed to insert parent event")?;

        let mut created = event.clone();
        created.id = self.conn.last_insert_rowid();
        log::info!("Created parent event {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn get_parent_event(&self, id: i64) -> Result<Option<ParentEvent>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM parent_events WHERE id = ?", PARENT_COLUMNS),
            [id],
            row_to_parent_event,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The most recently created parent event, if any.
    pub fn latest_parent_event(&self) -> Result<Option<ParentEvent>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {} FROM parent_events ORDER BY id DESC LIMIT 1",
                PARENT_COLUMNS
            ),
            [],
            row_to_parent_event,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
