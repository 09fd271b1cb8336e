//! SQLite-backed persistence service.
//! Operations are split across focused submodules per record type.

use anyhow::Result;
use rusqlite::Connection;

use super::PersistenceService;
use crate::models::calendar_event::{CalendarEvent, CalendarEventPatch, NewCalendarEvent};
use crate::models::parent_event::ParentEvent;
use crate::models::task::{NewTask, Task, TaskPatch};

mod calendar_events;
mod parent_events;
mod shared;
mod tasks;

/// Persistence service storing the run of show in SQLite.
pub struct SqlitePersistence<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> SqlitePersistence<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PersistenceService for SqlitePersistence<'_> {
    fn parent_event(&self, id: i64) -> Result<Option<ParentEvent>> {
        self.get_parent_event(id)
    }

    fn list_calendar_events(&self, event_id: i64) -> Result<Vec<CalendarEvent>> {
        self.calendar_events_for(event_id)
    }

    fn list_tasks(&self, event_id: i64) -> Result<Vec<Task>> {
        self.tasks_for(event_id)
    }

    fn create_calendar_event(&self, request: &NewCalendarEvent) -> Result<CalendarEvent> {
        self.insert_calendar_event(request)
    }

    fn update_calendar_event(&self, id: i64, patch: &CalendarEventPatch) -> Result<CalendarEvent> {
        self.patch_calendar_event(id, patch)
    }

    fn delete_calendar_event(&self, id: i64) -> Result<()> {
        self.remove_calendar_event(id)
    }

    fn create_task(&self, request: &NewTask) -> Result<Task> {
        self.insert_task(request)
    }

    fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task> {
        self.patch_task(id, patch)
    }

    fn delete_task(&self, id: i64) -> Result<()> {
        self.remove_task(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parent_event::TeamMember;
    use crate::services::database::Database;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
    }

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn seed_parent(service: &SqlitePersistence) -> ParentEvent {
        let parent = ParentEvent::new(
            "Summit",
            at(9, 0),
            at(17, 0),
            vec!["Stage B".into()],
            vec![TeamMember::new("Ana", "ana@example.com")],
        )
        .unwrap();
        service.create_parent_event(&parent).unwrap()
    }

    fn new_calendar_event(event_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> NewCalendarEvent {
        NewCalendarEvent {
            event_id,
            track: "PRIMARY".into(),
            start_time: start,
            end_time: end,
            title: String::new(),
            color: "66, 133, 244".into(),
        }
    }

    #[test]
    fn test_parent_event_round_trip() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());

        let created = seed_parent(&service);
        assert!(created.id > 0);

        let loaded = service.parent_event(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(service.latest_parent_event().unwrap(), Some(created));
    }

    #[test]
    fn test_get_nonexistent_parent_event() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        assert!(service.parent_event(999).unwrap().is_none());
    }

    #[test]
    fn test_create_calendar_event_returns_canonical_record() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);

        let created = service
            .create_calendar_event(&new_calendar_event(parent.id, at(10, 0), at(11, 0)))
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.track, "PRIMARY");
        assert_eq!(created.start_time, at(10, 0));
        assert_eq!(created.title, "");
        assert_eq!(created.tag, None);
    }

    #[test]
    fn test_create_rejects_inverted_interval() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);

        let result =
            service.create_calendar_event(&new_calendar_event(parent.id, at(11, 0), at(10, 0)));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_calendar_events_orders_by_start() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);

        service
            .create_calendar_event(&new_calendar_event(parent.id, at(14, 0), at(15, 0)))
            .unwrap();
        service
            .create_calendar_event(&new_calendar_event(parent.id, at(9, 0), at(10, 0)))
            .unwrap();

        let events = service.list_calendar_events(parent.id).unwrap();
        let starts: Vec<_> = events.iter().map(|e| e.start_time).collect();
        assert_eq!(starts, vec![at(9, 0), at(14, 0)]);
    }

    #[test]
    fn test_update_calendar_event_applies_patch() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);
        let created = service
            .create_calendar_event(&new_calendar_event(parent.id, at(10, 0), at(11, 0)))
            .unwrap();

        let patch = CalendarEventPatch {
            title: Some("Keynote".into()),
            tag: Some(Some("talk".into())),
            end_time: Some(at(11, 30)),
            ..CalendarEventPatch::default()
        };
        let updated = service.update_calendar_event(created.id, &patch).unwrap();

        assert_eq!(updated.title, "Keynote");
        assert_eq!(updated.tag.as_deref(), Some("talk"));
        assert_eq!(updated.end_time, at(11, 30));

        let reloaded = service.get_calendar_event(created.id).unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn test_update_nonexistent_calendar_event() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let result = service.update_calendar_event(999, &CalendarEventPatch::title("x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_calendar_event() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);
        let created = service
            .create_calendar_event(&new_calendar_event(parent.id, at(10, 0), at(11, 0)))
            .unwrap();

        service.delete_calendar_event(created.id).unwrap();
        assert!(service.get_calendar_event(created.id).unwrap().is_none());
        assert!(service.delete_calendar_event(created.id).is_err());
    }

    #[test]
    fn test_task_lifecycle() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);
        let ana = TeamMember::new("Ana", "ana@example.com");

        let created = service
            .create_task(&NewTask {
                event_id: parent.id,
                start_time: at(8, 0),
                end_time: at(9, 0),
                initial_assignee: ana.clone(),
            })
            .unwrap();
        assert_eq!(created.assigned_to, vec![ana]);
        assert_eq!(created.title, "");

        let updated = service
            .update_task(
                created.id,
                &TaskPatch {
                    title: Some("Doors".into()),
                    description: Some(Some("Open all doors".into())),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Doors");
        assert_eq!(service.list_tasks(parent.id).unwrap(), vec![updated]);

        service.delete_task(created.id).unwrap();
        assert!(service.list_tasks(parent.id).unwrap().is_empty());
    }

    #[test]
    fn test_deleting_parent_cascades() {
        let db = setup_test_db();
        let service = SqlitePersistence::new(db.connection());
        let parent = seed_parent(&service);
        service
            .create_calendar_event(&new_calendar_event(parent.id, at(10, 0), at(11, 0)))
            .unwrap();

        db.connection()
            .execute("DELETE FROM parent_events WHERE id = ?", [parent.id])
            .unwrap();

        assert!(service.list_calendar_events(parent.id).unwrap().is_empty());
    }
}
