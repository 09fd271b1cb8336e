use super::shared::{format_utc, to_utc_datetime};
use super::SqlitePersistence;
use crate::models::calendar_event::{CalendarEvent, CalendarEventPatch, NewCalendarEvent};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{self, params, Row};

const CALENDAR_EVENT_COLUMNS: &str =
    "id, event_id, track, start_time, end_time, title, color, tag, location";

fn row_to_calendar_event(row: &Row) -> rusqlite::Result<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        event_id: row.get(1)?,
        track: row.get(2)?,
        start_time: to_utc_datetime(row.get(3)?)?,
        end_time: to_utc_datetime(row.get(4)?)?,
        title: row.get(5)?,
        color: row.get(6)?,
        tag: row.get(7)?,
        location: row.get(8)?,
    })
}

impl<'a> SqlitePersistence<'a> {
    pub(super) fn insert_calendar_event(&self, request: &NewCalendarEvent) -> Result<CalendarEvent> {
        if request.end_time <= request.start_time {
            return Err(anyhow!("Calendar event end time must be after start time"));
        }

        let now = format_utc(Utc::now());
        self.conn
            .execute(
                "INSERT INTO calendar_events (
                    event_id, track, start_time, end_time, title, color, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    request.event_id,
                    request.track,
                    format_utc(request.start_time),
                    format_utc(request.end_time),
                    request.title,
                    request.color,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert calendar event")?;

        let id = self.conn.last_insert_rowid();
        self.get_calendar_event(id)?
            .ok_or_else(|| anyhow!("Calendar event {} vanished after insert", id))
    }

    pub fn get_calendar_event(&self, id: i64) -> Result<Option<CalendarEvent>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {} FROM calendar_events WHERE id = ?",
                CALENDAR_EVENT_COLUMNS
            ),
            [id],
            row_to_calendar_event,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(super) fn calendar_events_for(&self, event_id: i64) -> Result<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM calendar_events WHERE event_id = ? ORDER BY start_time, id",
            CALENDAR_EVENT_COLUMNS
        ))?;

        let events = stmt
            .query_map([event_id], row_to_calendar_event)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load calendar events")?;

        Ok(events)
    }

    pub(super) fn patch_calendar_event(
        &self,
        id: i64,
        patch: &CalendarEventPatch,
    ) -> Result<CalendarEvent> {
        let mut event = self
            .get_calendar_event(id)?
            .ok_or_else(|| anyhow!("Calendar event with id {} not found", id))?;
        event.apply(patch);

        if event.end_time <= event.start_time {
            return Err(anyhow!("Calendar event end time must be after start time"));
        }

        self.conn
            .execute(
                "UPDATE calendar_events SET
                    start_time = ?, end_time = ?, title = ?, color = ?, tag = ?,
                    location = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    format_utc(event.start_time),
                    format_utc(event.end_time),
                    event.title,
                    event.color,
                    event.tag,
                    event.location,
                    format_utc(Utc::now()),
                    id,
                ],
            )
            .context("Failed to update calendar event")?;

        Ok(event)
    }

    pub(super) fn remove_calendar_event(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM calendar_events WHERE id = ?", [id])
            .context("Failed to delete calendar event")?;

        if rows_affected == 0 {
            return Err(anyhow!("Calendar event with id {} not found", id));
        }

        Ok(())
    }
}
