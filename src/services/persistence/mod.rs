//! The persistence collaborator of the grid engine.
//!
//! The engine issues create/update/delete calls and folds the canonical
//! record that comes back into its local mirror. `SqlitePersistence` is the
//! implementation the planner ships with.

use anyhow::Result;

use crate::models::calendar_event::{CalendarEvent, CalendarEventPatch, NewCalendarEvent};
use crate::models::parent_event::ParentEvent;
use crate::models::task::{NewTask, Task, TaskPatch};

pub mod sqlite;

pub use sqlite::SqlitePersistence;

#[cfg_attr(test, mockall::automock)]
pub trait PersistenceService {
    fn parent_event(&self, id: i64) -> Result<Option<ParentEvent>>;
    fn list_calendar_events(&self, event_id: i64) -> Result<Vec<CalendarEvent>>;
    fn list_tasks(&self, event_id: i64) -> Result<Vec<Task>>;

    fn create_calendar_event(&self, request: &NewCalendarEvent) -> Result<CalendarEvent>;
    fn update_calendar_event(&self, id: i64, patch: &CalendarEventPatch) -> Result<CalendarEvent>;
    fn delete_calendar_event(&self, id: i64) -> Result<()>;

    fn create_task(&self, request: &NewTask) -> Result<Task>;
    fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task>;
    fn delete_task(&self, id: i64) -> Result<()>;
}
