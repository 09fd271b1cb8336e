//! Local mirror of the run of show.
//!
//! The store is the single source of truth for rendering between network
//! round-trips. Creates and edits are validated locally, sent to the
//! persistence service, and the canonical record that comes back replaces the
//! local one. Color changes are the exception: they apply immediately and are
//! reverted if the service refuses them.

use anyhow::{anyhow, Result};

use crate::models::calendar_event::{CalendarEvent, CalendarEventPatch, NewCalendarEvent};
use crate::models::interval::Interval;
use crate::models::lane::{ItemRef, LaneId};
use crate::models::parent_event::{ParentEvent, TeamMember};
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::services::persistence::PersistenceService;

mod error;
pub mod validation;

pub use error::ScheduleError;

/// One item as it sits in a lane, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneEntry {
    pub item: ItemRef,
    pub interval: Interval,
    pub title: String,
    /// `"r, g, b"`; tasks carry no color of their own.
    pub color: Option<String>,
}

pub struct ScheduleStore<P> {
    service: P,
    parent: ParentEvent,
    calendar_events: Vec<CalendarEvent>,
    tasks: Vec<Task>,
}

impl<P: PersistenceService> ScheduleStore<P> {
    pub fn new(
        service: P,
        parent: ParentEvent,
        calendar_events: Vec<CalendarEvent>,
        tasks: Vec<Task>,
    ) -> Self {
        let mut store = Self {
            service,
            parent,
            calendar_events,
            tasks,
        };
        store.sort_items();
        store
    }

    /// Load a parent event and its items from the service.
    pub fn load(service: P, event_id: i64) -> Result<Self> {
        let parent = service
            .parent_event(event_id)?
            .ok_or_else(|| anyhow!("Event {} not found", event_id))?;
        let calendar_events = service.list_calendar_events(event_id)?;
        let tasks = service.list_tasks(event_id)?;
        log::info!(
            "Loaded event {} with {} calendar events and {} tasks",
            event_id,
            calendar_events.len(),
            tasks.len()
        );
        Ok(Self::new(service, parent, calendar_events, tasks))
    }

    /// Replace the mirror with whatever the service holds now. On error the
    /// mirror is left untouched.
    pub fn reload(&mut self) -> Result<()> {
        let event_id = self.parent.id;
        let parent = self.service.parent_event(event_id)?;
        let calendar_events = self.service.list_calendar_events(event_id)?;
        let tasks = self.service.list_tasks(event_id)?;

        if let Some(parent) = parent {
            self.parent = parent;
        }
        self.calendar_events = calendar_events;
        self.tasks = tasks;
        self.sort_items();
        Ok(())
    }

    pub fn parent(&self) -> &ParentEvent {
        &self.parent
    }

    pub fn service(&self) -> &P {
        &self.service
    }

    pub fn calendar_events(&self) -> &[CalendarEvent] {
        &self.calendar_events
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn calendar_event(&self, id: i64) -> Option<&CalendarEvent> {
        self.calendar_events.iter().find(|e| e.id == id)
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn item_interval(&self, item: ItemRef) -> Option<Interval> {
        match item {
            ItemRef::CalendarEvent(id) => self.calendar_event(id).map(CalendarEvent::interval),
            ItemRef::Task(id) => self.task(id).map(Task::interval),
        }
    }

    pub fn item_title(&self, item: ItemRef) -> Option<&str> {
        match item {
            ItemRef::CalendarEvent(id) => self.calendar_event(id).map(|e| e.title.as_str()),
            ItemRef::Task(id) => self.task(id).map(|t| t.title.as_str()),
        }
    }

    /// Items of one lane, ordered by start time then id.
    pub fn lane_entries(&self, lane: &LaneId) -> Vec<LaneEntry> {
        match lane {
            LaneId::Track(track) => self
                .calendar_events
                .iter()
                .filter(|e| &e.track == track)
                .map(|e| LaneEntry {
                    item: ItemRef::CalendarEvent(e.id),
                    interval: e.interval(),
                    title: e.title.clone(),
                    color: Some(e.color.clone()),
                })
                .collect(),
            LaneId::Person(email) => self
                .tasks
                .iter()
                .filter(|t| t.is_assigned_to(email))
                .map(|t| LaneEntry {
                    item: ItemRef::Task(t.id),
                    interval: t.interval(),
                    title: t.title.clone(),
                    color: None,
                })
                .collect(),
        }
    }

    // ----- calendar events -----

    /// Validate and create a calendar event. The local mirror only changes
    /// once the service has answered.
    pub fn create_calendar_event(
        &mut self,
        track: &str,
        interval: Interval,
        color: &str,
    ) -> Result<i64, ScheduleError> {
        if !self.parent.has_track(track) {
            return Err(ScheduleError::UnknownTrack(track.to_string()));
        }
        validation::check_interval(&interval, &self.parent.window())?;
        validation::check_track_overlap(&interval, track, &self.calendar_events, None)?;

        let request = NewCalendarEvent {
            event_id: self.parent.id,
            track: track.to_string(),
            start_time: interval.start,
            end_time: interval.end,
            title: String::new(),
            color: color.to_string(),
        };

        match self.service.create_calendar_event(&request) {
            Ok(created) => {
                log::info!(
                    "Created calendar event {} on {} ({} - {})",
                    created.id,
                    created.track,
                    created.start_time,
                    created.end_time
                );
                let id = created.id;
                self.upsert_calendar_event(created);
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to create calendar event on {}: {:#}", track, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    /// Apply a non-color edit. Time changes are validated first.
    pub fn update_calendar_event(
        &mut self,
        id: i64,
        patch: &CalendarEventPatch,
    ) -> Result<(), ScheduleError> {
        let current = self
            .calendar_event(id)
            .ok_or(ScheduleError::NotFound(id))?;

        if patch.touches_times() {
            let mut proposed = current.clone();
            proposed.apply(patch);
            let interval = proposed.interval();
            validation::check_interval(&interval, &self.parent.window())?;
            validation::check_track_overlap(
                &interval,
                &proposed.track,
                &self.calendar_events,
                Some(id),
            )?;
        }

        match self.service.update_calendar_event(id, patch) {
            Ok(updated) => {
                log::debug!("Updated calendar event {}", id);
                self.upsert_calendar_event(updated);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to update calendar event {}: {:#}", id, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    /// Optimistically recolor a calendar event, reverting on failure.
    pub fn set_calendar_event_color(&mut self, id: i64, color: &str) -> Result<(), ScheduleError> {
        let event = self
            .calendar_events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ScheduleError::NotFound(id))?;
        let previous = std::mem::replace(&mut event.color, color.to_string());

        match self
            .service
            .update_calendar_event(id, &CalendarEventPatch::color(color))
        {
            Ok(updated) => {
                self.upsert_calendar_event(updated);
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "Failed to recolor calendar event {}, reverting to {}: {:#}",
                    id,
                    previous,
                    err
                );
                if let Some(event) = self.calendar_events.iter_mut().find(|e| e.id == id) {
                    event.color = previous;
                }
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    pub fn delete_calendar_event(&mut self, id: i64) -> Result<(), ScheduleError> {
        if self.calendar_event(id).is_none() {
            return Err(ScheduleError::NotFound(id));
        }

        match self.service.delete_calendar_event(id) {
            Ok(()) => {
                log::info!("Deleted calendar event {}", id);
                self.calendar_events.retain(|e| e.id != id);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to delete calendar event {}: {:#}", id, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    // ----- tasks -----

    /// Validate and create an untitled task for `assignee`.
    pub fn create_task(
        &mut self,
        assignee: &TeamMember,
        interval: Interval,
    ) -> Result<i64, ScheduleError> {
        validation::check_interval(&interval, &self.parent.window())?;

        let request = NewTask {
            event_id: self.parent.id,
            start_time: interval.start,
            end_time: interval.end,
            initial_assignee: assignee.clone(),
        };

        match self.service.create_task(&request) {
            Ok(created) => {
                log::info!(
                    "Created task {} for {} ({} - {})",
                    created.id,
                    assignee.email,
                    created.start_time,
                    created.end_time
                );
                let id = created.id;
                self.upsert_task(created);
                Ok(id)
            }
            Err(err) => {
                log::error!("Failed to create task for {}: {:#}", assignee.email, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    pub fn update_task(&mut self, id: i64, patch: &TaskPatch) -> Result<(), ScheduleError> {
        let current = self.task(id).ok_or(ScheduleError::NotFound(id))?;

        if patch.touches_times() {
            let mut proposed = current.clone();
            proposed.apply(patch);
            validation::check_interval(&proposed.interval(), &self.parent.window())?;
        }

        match self.service.update_task(id, patch) {
            Ok(updated) => {
                log::debug!("Updated task {}", id);
                self.upsert_task(updated);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to update task {}: {:#}", id, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    pub fn delete_task(&mut self, id: i64) -> Result<(), ScheduleError> {
        if self.task(id).is_none() {
            return Err(ScheduleError::NotFound(id));
        }

        match self.service.delete_task(id) {
            Ok(()) => {
                log::info!("Deleted task {}", id);
                self.tasks.retain(|t| t.id != id);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to delete task {}: {:#}", id, err);
                Err(ScheduleError::Persistence(err))
            }
        }
    }

    // ----- item-generic helpers used by the grid -----

    pub fn update_item_interval(
        &mut self,
        item: ItemRef,
        interval: Interval,
    ) -> Result<(), ScheduleError> {
        match item {
            ItemRef::CalendarEvent(id) => {
                self.update_calendar_event(id, &CalendarEventPatch::times(interval))
            }
            ItemRef::Task(id) => self.update_task(id, &TaskPatch::times(interval)),
        }
    }

    pub fn rename_item(&mut self, item: ItemRef, title: &str) -> Result<(), ScheduleError> {
        match item {
            ItemRef::CalendarEvent(id) => {
                self.update_calendar_event(id, &CalendarEventPatch::title(title))
            }
            ItemRef::Task(id) => self.update_task(id, &TaskPatch::title(title)),
        }
    }

    pub fn delete_item(&mut self, item: ItemRef) -> Result<(), ScheduleError> {
        match item {
            ItemRef::CalendarEvent(id) => self.delete_calendar_event(id),
            ItemRef::Task(id) => self.delete_task(id),
        }
    }

    fn upsert_calendar_event(&mut self, event: CalendarEvent) {
        match self.calendar_events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.calendar_events.push(event),
        }
        self.sort_items();
    }

    fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.sort_items();
    }

    fn sort_items(&mut self) {
        self.calendar_events
            .sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        self.tasks
            .sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    }
}
