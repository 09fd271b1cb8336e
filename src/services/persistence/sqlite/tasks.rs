use super::shared::{format_utc, from_json_column, to_json_column, to_utc_datetime};
use super::SqlitePersistence;
use crate::models::task::{NewTask, Task, TaskPatch};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{self, params, Row};

const TASK_COLUMNS: &str =
    "id, event_id, start_time, end_time, title, description, assigned_to, location";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        event_id: row.get(1)?,
        start_time: to_utc_datetime(row.get(2)?)?,
        end_time: to_utc_datetime(row.get(3)?)?,
        title: row.get(4)?,
        description: row.get(5)?,
        assigned_to: from_json_column(row.get(6)?)?,
        location: row.get(7)?,
    })
}

impl<'a> SqlitePersistence<'a> {
    pub(super) fn insert_task(&self, request: &NewTask) -> Result<Task> {
        if request.end_time <= request.start_time {
            return Err(anyhow!("Task end time must be after start time"));
        }

        let now = format_utc(Utc::now());
        let assignees = to_json_column(&vec![request.initial_assignee.clone()])?;
        self.conn
            .execute(
                "INSERT INTO tasks (
                    event_id, start_time, end_time, title, assigned_to, created_at, updated_at
                ) VALUES (?, ?, ?, '', ?, ?, ?)",
                params![
                    request.event_id,
                    format_utc(request.start_time),
                    format_utc(request.end_time),
                    assignees,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert task")?;

        let id = self.conn.last_insert_rowid();
        self.get_task(id)?
            .ok_or_else(|| anyhow!("Task {} vanished after insert", id))
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
            [id],
            row_to_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(super) fn tasks_for(&self, event_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE event_id = ? ORDER BY start_time, id",
            TASK_COLUMNS
        ))?;

        let tasks = stmt
            .query_map([event_id], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load tasks")?;

        Ok(tasks)
    }

    pub(super) fn patch_task(&self, id: i64, patch: &TaskPatch) -> Result<Task> {
        let mut task = self
            .get_task(id)?
            .ok_or_else(|| anyhow!("Task with id {} not found", id))?;
        task.apply(patch);

        if task.end_time <= task.start_time {
            return Err(anyhow!("Task end time must be after start time"));
        }

        self.conn
            .execute(
                "UPDATE tasks SET
                    start_time = ?, end_time = ?, title = ?, description = ?,
                    location = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    format_utc(task.start_time),
                    format_utc(task.end_time),
                    task.title,
                    task.description,
                    task.location,
                    format_utc(Utc::now()),
                    id,
                ],
            )
            .context("Failed to update task")?;

        Ok(task)
    }

    pub(super) fn remove_task(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?", [id])
            .context("Failed to delete task")?;

        if rows_affected == 0 {
            return Err(anyhow!("Task with id {} not found", id));
        }

        Ok(())
    }
}
