//! Ties the grid engine together.
//!
//! `Planner` owns the schedule mirror, the gesture controller, the selection
//! and the zoom store. The egui app feeds it pointer and keyboard input and
//! draws whatever layout it hands back; everything here runs without a
//! window so it can be exercised directly.

use egui::{Key, Pos2, Rect};

use super::confirm::{ConfirmResult, NoticeState};
use super::drag::{DragCommit, DragController, LaneResolver, PointerPress};
use super::palette;
use super::selection::{SelectionAction, SelectionModel};
use super::time_axis::TimeAxis;
use super::views::grid_view::{GridInput, GridLayout, LaneColumn};
use super::zoom::ZoomModel;
use crate::models::calendar_event::CalendarEventPatch;
use crate::models::interval::Interval;
use crate::models::lane::{ItemRef, LaneId};
use crate::models::parent_event::TeamMember;
use crate::models::settings::PlannerConfig;
use crate::models::task::TaskPatch;
use crate::services::persistence::PersistenceService;
use crate::services::schedule::{ScheduleError, ScheduleStore};
use crate::utils::date::floor_to_hour;

/// Lane lookups for the drag controller, backed by the store and the
/// current frame's layout.
struct PlannerLanes<'p, P> {
    store: &'p ScheduleStore<P>,
    layout: &'p GridLayout,
}

impl<P: PersistenceService> LaneResolver for PlannerLanes<'_, P> {
    fn window(&self) -> Interval {
        self.store.parent().window()
    }

    fn lane_rect(&self, lane: &LaneId) -> Option<Rect> {
        self.layout.lane_rect(lane)
    }

    fn lane_items(&self, lane: &LaneId) -> Vec<(ItemRef, Interval)> {
        self.store
            .lane_entries(lane)
            .into_iter()
            .map(|entry| (entry.item, entry.interval))
            .collect()
    }
}

pub struct Planner<'a, P> {
    store: ScheduleStore<P>,
    drag: DragController,
    selection: SelectionModel,
    zoom: ZoomModel<'a>,
    notice: NoticeState,
    current_user: TeamMember,
}

impl<'a, P: PersistenceService> Planner<'a, P> {
    pub fn new(store: ScheduleStore<P>, zoom: ZoomModel<'a>, config: &PlannerConfig) -> Self {
        Self {
            store,
            drag: DragController::new(config.drag_threshold_px, config.default_duration()),
            selection: SelectionModel::new(),
            zoom,
            notice: NoticeState::default(),
            current_user: config.current_user.clone(),
        }
    }

    pub fn store(&self) -> &ScheduleStore<P> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ScheduleStore<P> {
        &mut self.store
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Text of the inline editor's title field.
    pub fn draft_title_mut(&mut self) -> &mut String {
        self.selection.draft_title_mut()
    }

    pub fn zoom(&self) -> &ZoomModel<'a> {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomModel<'a> {
        &mut self.zoom
    }

    pub fn notice(&self) -> &NoticeState {
        &self.notice
    }

    pub fn notice_mut(&mut self) -> &mut NoticeState {
        &mut self.notice
    }

    /// Axis anchored on the hour the parent event opens in.
    pub fn axis(&self) -> TimeAxis {
        self.zoom
            .axis(floor_to_hour(self.store.parent().start_time))
    }

    /// Track lanes in event order, then "You", then each other team member.
    pub fn lanes(&self) -> Vec<(LaneId, String)> {
        let parent = self.store.parent();
        let mut lanes: Vec<(LaneId, String)> = parent
            .tracks
            .iter()
            .map(|track| (LaneId::Track(track.clone()), track.clone()))
            .collect();
        lanes.push((
            LaneId::Person(self.current_user.email.clone()),
            self.current_user.name.clone(),
        ));
        lanes.extend(
            parent
                .team_members
                .iter()
                .filter(|m| m.email != self.current_user.email)
                .map(|m| (LaneId::Person(m.email.clone()), m.name.clone())),
        );
        lanes
    }

    pub fn lane_columns(&self) -> Vec<LaneColumn> {
        self.lanes()
            .into_iter()
            .map(|(lane, header)| LaneColumn {
                entries: self.store.lane_entries(&lane),
                lane,
                header,
            })
            .collect()
    }

    /// Lay the grid out at `origin`, including any live drag preview.
    pub fn layout(&self, origin: Pos2, width: f32) -> GridLayout {
        let columns = self.lane_columns();
        GridLayout::compute(&GridInput {
            origin,
            width,
            axis: self.axis(),
            window: self.store.parent().window(),
            columns: &columns,
            selection: self.selection.selection(),
            active_item: self.drag.active_item(),
            preview: self.drag.preview(),
        })
    }

    /// Whether pointer input should reach the grid at all.
    pub fn is_blocked(&self) -> bool {
        self.notice.is_open() || self.selection.confirm().is_open()
    }

    /// Pointer pressed. With a selection active the press lands on the scrim
    /// and only dismisses the selection (unless it hit the editor).
    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        modifier: bool,
        layout: &GridLayout,
        editor: Option<Rect>,
    ) -> bool {
        if self.is_blocked() {
            return false;
        }
        if self.selection.is_active() {
            if let Some(action) = self.selection.scrim_click(pos, editor) {
                self.apply_selection_action(action);
            }
            return false;
        }

        let Some((lane, target)) = layout.hit_test(pos) else {
            return false;
        };
        let press = PointerPress {
            pos,
            lane,
            target,
            modifier,
            selection_active: self.selection.is_active(),
        };
        let axis = self.axis();
        let lanes = PlannerLanes {
            store: &self.store,
            layout,
        };
        self.drag.pointer_down(press, &axis, &lanes)
    }

    pub fn pointer_move(&mut self, pos: Pos2, modifier: bool) {
        let axis = self.axis();
        self.drag.pointer_move(pos, modifier, &axis);
    }

    /// Pointer released: commit whatever the gesture produced, then return
    /// the controller to idle regardless of the outcome.
    pub fn pointer_up(&mut self, pos: Pos2, layout: &GridLayout) {
        let axis = self.axis();
        let commit = {
            let lanes = PlannerLanes {
                store: &self.store,
                layout,
            };
            self.drag.pointer_up(pos, &axis, &lanes)
        };
        if let Some(commit) = commit {
            self.apply_commit(commit);
            self.drag.settle();
        }
    }

    pub fn handle_key(&mut self, key: Key, text_has_focus: bool) {
        if key == Key::Escape && !self.drag.is_idle() {
            self.drag.cancel();
            return;
        }
        if self.notice.is_open() {
            return;
        }

        let color = match self.selection.selected_item() {
            Some(ItemRef::CalendarEvent(id)) => {
                self.store.calendar_event(id).map(|e| e.color.clone())
            }
            _ => None,
        };
        if let Some(action) = self
            .selection
            .handle_key(key, text_has_focus, color.as_deref())
        {
            self.apply_selection_action(action);
        }
    }

    /// Outcome of the delete confirmation dialog.
    pub fn resolve_confirm(&mut self, result: ConfirmResult) {
        let Some(item) = self.selection.resolve_confirm(result) else {
            return;
        };
        if let Err(e) = self.store.delete_item(item) {
            self.report(e);
        }
    }

    /// The editor's delete button.
    pub fn request_delete(&mut self) {
        self.selection.request_delete();
    }

    /// Recolor the selected calendar event from the editor's swatches.
    pub fn recolor_selected(&mut self, color: &str) {
        let Some(ItemRef::CalendarEvent(id)) = self.selection.selected_item() else {
            return;
        };
        if let Err(e) = self.store.set_calendar_event_color(id, color) {
            self.report(e);
        }
    }

    /// Save the editor's title without closing it.
    pub fn commit_title(&mut self) {
        let Some(item) = self.selection.selected_item() else {
            return;
        };
        let draft = self.selection.draft_title().trim().to_string();
        if draft.is_empty() || self.store.item_title(item) == Some(draft.as_str()) {
            return;
        }
        if let Err(e) = self.store.rename_item(item, &draft) {
            self.report(e);
        }
    }

    /// Tag a calendar event. Blank text clears the tag.
    pub fn set_tag(&mut self, id: i64, tag: &str) {
        let tag = non_blank(tag);
        let current = self.store.calendar_event(id).map(|e| e.tag.clone());
        if current.is_none() || current == Some(tag.clone()) {
            return;
        }
        if let Err(e) = self
            .store
            .update_calendar_event(id, &CalendarEventPatch::tag(tag))
        {
            self.report(e);
        }
    }

    /// Set where an item happens. Blank text clears the location.
    pub fn set_location(&mut self, item: ItemRef, location: &str) {
        let location = non_blank(location);
        let current = match item {
            ItemRef::CalendarEvent(id) => self.store.calendar_event(id).map(|e| e.location.clone()),
            ItemRef::Task(id) => self.store.task(id).map(|t| t.location.clone()),
        };
        if current.is_none() || current == Some(location.clone()) {
            return;
        }
        let result = match item {
            ItemRef::CalendarEvent(id) => self
                .store
                .update_calendar_event(id, &CalendarEventPatch::location(location)),
            ItemRef::Task(id) => self.store.update_task(id, &TaskPatch::location(location)),
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    pub fn set_description(&mut self, id: i64, description: &str) {
        let description = non_blank(description);
        let current = self.store.task(id).map(|t| t.description.clone());
        if current.is_none() || current == Some(description.clone()) {
            return;
        }
        if let Err(e) = self
            .store
            .update_task(id, &TaskPatch::description(description))
        {
            self.report(e);
        }
    }

    /// The editor's close button.
    pub fn close_editor(&mut self) {
        if let Some(item) = self.selection.clear() {
            self.finish_editing(item);
        }
    }

    /// Poll shared zoom state and refresh the schedule mirror when due.
    /// The refresh waits while a gesture is in flight.
    pub fn tick(&mut self) -> bool {
        if !self.zoom.poll_due() {
            return false;
        }
        let zoom_changed = self.zoom.poll();
        if !self.drag.is_idle() {
            return zoom_changed;
        }

        let before = (
            self.store.calendar_events().to_vec(),
            self.store.tasks().to_vec(),
        );
        if let Err(e) = self.store.reload() {
            log::warn!("Schedule refresh failed: {:#}", e);
            return zoom_changed;
        }
        let schedule_changed = before.0 != self.store.calendar_events()
            || before.1 != self.store.tasks();
        if schedule_changed {
            log::debug!("Schedule changed elsewhere");
        }
        zoom_changed || schedule_changed
    }

    pub fn select_item(&mut self, item: ItemRef, lane: &LaneId) {
        let title = self.store.item_title(item).unwrap_or_default().to_string();
        let draft = self.selection.draft_title().to_string();
        if let Some(previous) = self.selection.select(item, lane, &title) {
            self.finish_editing_with(previous, &draft);
        }
    }

    fn apply_commit(&mut self, commit: DragCommit) {
        match commit {
            DragCommit::Create { lane, interval } => {
                let created = match &lane {
                    LaneId::Track(track) => self
                        .store
                        .create_calendar_event(track, interval, &palette::default_color())
                        .map(ItemRef::CalendarEvent),
                    LaneId::Person(email) => {
                        let Some(member) = self.member_for(email) else {
                            log::warn!("No team member with email {}", email);
                            return;
                        };
                        self.store
                            .create_task(&member, interval)
                            .map(ItemRef::Task)
                    }
                };
                match created {
                    Ok(item) => self.select_item(item, &lane),
                    Err(e) => self.report(e),
                }
            }
            DragCommit::Move { item, interval } | DragCommit::Resize { item, interval } => {
                if let Err(e) = self.store.update_item_interval(item, interval) {
                    self.report(e);
                }
            }
            DragCommit::Select { item, lane } => self.select_item(item, &lane),
        }
    }

    fn apply_selection_action(&mut self, action: SelectionAction) {
        match action {
            SelectionAction::Cleared(item) => self.finish_editing(item),
            SelectionAction::Recolor { id, color } => {
                if let Err(e) = self.store.set_calendar_event_color(id, &color) {
                    self.report(e);
                }
            }
            SelectionAction::ConfirmRequested => {}
        }
    }

    fn finish_editing(&mut self, item: ItemRef) {
        let draft = self.selection.draft_title().to_string();
        self.finish_editing_with(item, &draft);
    }

    /// The editor lost `item`: save a changed title, or delete the item when
    /// it was left without one.
    fn finish_editing_with(&mut self, item: ItemRef, draft: &str) {
        let Some(current) = self.store.item_title(item) else {
            return;
        };
        let title = draft.trim();
        let result = if title.is_empty() {
            log::info!("Removing {:?}, closed without a title", item);
            self.store.delete_item(item)
        } else if title != current {
            self.store.rename_item(item, title)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn member_for(&self, email: &str) -> Option<TeamMember> {
        if email == self.current_user.email {
            return Some(self.current_user.clone());
        }
        self.store.parent().member_by_email(email).cloned()
    }

    /// Rejections block with a message; service failures were already logged
    /// by the store and leave the grid as it was.
    fn report(&mut self, err: ScheduleError) {
        if err.is_user_facing() {
            log::warn!("Rejected edit: {}", err);
            self.notice.show(err.to_string());
        } else {
            log::debug!("Edit failed without user-facing message: {}", err);
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::calendar_event::{CalendarEvent, NewCalendarEvent};
    use crate::models::parent_event::ParentEvent;
    use crate::models::task::{NewTask, Task};
    use crate::services::persistence::MockPersistenceService;
    use crate::services::storage::MemoryStorage;
    use crate::ui_egui::drag::DragPhase;
    use crate::utils::clock::ManualClock;
    use anyhow::anyhow;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
    }

    fn parent() -> ParentEvent {
        let mut parent = ParentEvent::new(
            "Summit",
            at(9, 0),
            at(17, 0),
            vec!["Stage B".into()],
            vec![TeamMember::new("Ana", "ana@example.com")],
        )
        .unwrap();
        parent.id = 1;
        parent
    }

    fn calendar_event(id: i64, start: DateTime<Utc>, end: DateTime<Utc>, title: &str) -> CalendarEvent {
        CalendarEvent {
            id,
            event_id: 1,
            start_time: start,
            end_time: end,
            title: title.into(),
            color: palette::default_color(),
            tag: None,
            track: "PRIMARY".into(),
            location: None,
        }
    }

    fn created_event(request: &NewCalendarEvent, id: i64) -> CalendarEvent {
        CalendarEvent {
            id,
            event_id: request.event_id,
            start_time: request.start_time,
            end_time: request.end_time,
            title: request.title.clone(),
            color: request.color.clone(),
            tag: None,
            track: request.track.clone(),
            location: None,
        }
    }

    fn created_task(request: &NewTask, id: i64) -> Task {
        Task {
            id,
            event_id: request.event_id,
            start_time: request.start_time,
            end_time: request.end_time,
            title: String::new(),
            description: None,
            assigned_to: vec![request.initial_assignee.clone()],
            location: None,
        }
    }

    fn planner(
        mock: MockPersistenceService,
        events: Vec<CalendarEvent>,
    ) -> Planner<'static, MockPersistenceService> {
        planner_with(mock, events, Vec::new(), &ManualClock::new(at(9, 0)))
    }

    fn planner_with(
        mock: MockPersistenceService,
        events: Vec<CalendarEvent>,
        tasks: Vec<Task>,
        clock: &ManualClock,
    ) -> Planner<'static, MockPersistenceService> {
        let store = ScheduleStore::new(mock, parent(), events, tasks);
        let zoom = ZoomModel::new(
            Box::new(MemoryStorage::new()),
            Rc::new(clock.clone()),
            99,
            Duration::seconds(30),
        );
        Planner::new(store, zoom, &PlannerConfig::default())
    }

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            event_id: 1,
            start_time: at(13, 0),
            end_time: at(14, 0),
            title: title.into(),
            description: None,
            assigned_to: vec![TeamMember::new("Ana", "ana@example.com")],
            location: None,
        }
    }

    fn primary() -> LaneId {
        LaneId::Track("PRIMARY".into())
    }

    fn point_in(layout: &GridLayout, lane: &LaneId, instant: DateTime<Utc>) -> Pos2 {
        let rect = layout.lane_rect(lane).unwrap();
        Pos2::new(rect.center().x, rect.top() + (instant - at(9, 0)).num_minutes() as f32 * 100.0 / 60.0)
    }

    fn click(planner: &mut Planner<'static, MockPersistenceService>, lane: &LaneId, instant: DateTime<Utc>) {
        let layout = planner.layout(Pos2::ZERO, 1200.0);
        let pos = point_in(&layout, lane, instant);
        planner.pointer_down(pos, false, &layout, None);
        planner.pointer_up(pos, &layout);
    }

    #[test]
    fn test_lanes_order_tracks_then_people() {
        let planner = planner(MockPersistenceService::new(), Vec::new());
        let lanes: Vec<LaneId> = planner.lanes().into_iter().map(|(lane, _)| lane).collect();

        assert_eq!(
            lanes,
            vec![
                LaneId::Track("PRIMARY".into()),
                LaneId::Track("Stage B".into()),
                LaneId::Person("you@localhost".into()),
                LaneId::Person("ana@example.com".into()),
            ]
        );
        assert_eq!(planner.lanes()[2].1, "You");
    }

    #[test]
    fn test_click_creates_and_selects_event() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_calendar_event()
            .withf(|req| {
                req.start_time == at(10, 0) && req.end_time == at(11, 0) && req.track == "PRIMARY"
            })
            .times(1)
            .returning(|req| Ok(created_event(req, 10)));
        let mut planner = planner(mock, Vec::new());

        click(&mut planner, &primary(), at(10, 7));

        assert_eq!(planner.store().calendar_events().len(), 1);
        assert_eq!(
            planner.selection().selected_item(),
            Some(ItemRef::CalendarEvent(10))
        );
        assert!(planner.drag().is_idle());
    }

    #[test]
    fn test_drag_in_person_column_creates_task() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_task()
            .withf(|req| {
                req.initial_assignee.email == "ana@example.com"
                    && req.start_time == at(13, 0)
                    && req.end_time == at(14, 30)
            })
            .times(1)
            .returning(|req| Ok(created_task(req, 20)));
        let mut planner = planner(mock, Vec::new());
        let ana = LaneId::Person("ana@example.com".into());

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(point_in(&layout, &ana, at(13, 0)), false, &layout, None);
        planner.pointer_move(point_in(&layout, &ana, at(14, 30)), false);
        assert!(planner.drag().preview().is_some());
        planner.pointer_up(point_in(&layout, &ana, at(14, 30)), &layout);

        assert_eq!(planner.store().tasks().len(), 1);
        assert_eq!(
            planner.selection().selection(),
            &crate::ui_egui::selection::Selection::Task { id: 20, column: ana }
        );
    }

    #[test]
    fn test_service_failure_on_create_shows_nothing() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_calendar_event()
            .times(1)
            .returning(|_| Err(anyhow!("503 Service Unavailable")));
        let mut planner = planner(mock, Vec::new());

        click(&mut planner, &primary(), at(10, 7));

        assert!(planner.store().calendar_events().is_empty());
        assert!(!planner.selection().is_active());
        assert!(!planner.notice().is_open());
        assert!(planner.drag().is_idle());
    }

    #[test]
    fn test_overlap_rejection_blocks_with_notice() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_calendar_event().never();
        mock.expect_update_calendar_event().never();
        let mut planner = planner(
            mock,
            vec![calendar_event(1, at(10, 0), at(11, 0), "Doors")],
        );

        // Press just after the existing item and drag up across it.
        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(point_in(&layout, &primary(), at(11, 30)), false, &layout, None);
        planner.pointer_move(point_in(&layout, &primary(), at(9, 30)), false);
        planner.pointer_up(point_in(&layout, &primary(), at(9, 30)), &layout);

        assert!(planner.notice().is_open());
        assert!(planner.notice().message().unwrap().contains("Doors"));
        assert_eq!(planner.store().calendar_events().len(), 1);
        assert!(planner.is_blocked());
    }

    #[test]
    fn test_press_on_existing_item_selects_it() {
        let mut planner = planner(
            MockPersistenceService::new(),
            vec![calendar_event(1, at(10, 0), at(12, 0), "Doors")],
        );

        click(&mut planner, &primary(), at(11, 0));

        assert_eq!(
            planner.selection().selected_item(),
            Some(ItemRef::CalendarEvent(1))
        );
        assert_eq!(planner.selection().draft_title(), "Doors");
    }

    #[test]
    fn test_scrim_click_clears_and_saves_title() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_calendar_event()
            .withf(|id, patch| *id == 1 && patch.title.as_deref() == Some("Doors open"))
            .times(1)
            .returning(|_, _| {
                Ok(calendar_event(1, at(10, 0), at(12, 0), "Doors open"))
            });
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(12, 0), "Doors")]);
        planner.select_item(ItemRef::CalendarEvent(1), &primary());
        planner.draft_title_mut().push_str(" open");

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        let armed = planner.pointer_down(Pos2::new(900.0, 500.0), false, &layout, None);

        assert!(!armed);
        assert!(!planner.selection().is_active());
        assert_eq!(planner.store().calendar_event(1).unwrap().title, "Doors open");
    }

    #[test]
    fn test_click_inside_editor_keeps_selection() {
        let mut planner = planner(
            MockPersistenceService::new(),
            vec![calendar_event(1, at(10, 0), at(12, 0), "Doors")],
        );
        planner.select_item(ItemRef::CalendarEvent(1), &primary());
        let editor = Rect::from_min_size(Pos2::new(400.0, 100.0), egui::vec2(240.0, 160.0));

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(Pos2::new(450.0, 150.0), false, &layout, Some(editor));

        assert!(planner.selection().is_active());
    }

    #[test]
    fn test_escape_with_blank_title_deletes_item() {
        let mut mock = MockPersistenceService::new();
        mock.expect_delete_calendar_event()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(11, 0), "")]);
        planner.select_item(ItemRef::CalendarEvent(1), &primary());

        planner.handle_key(Key::Escape, false);

        assert!(!planner.selection().is_active());
        assert!(planner.store().calendar_events().is_empty());
    }

    #[test]
    fn test_backspace_deletes_after_confirmation() {
        let mut mock = MockPersistenceService::new();
        mock.expect_delete_calendar_event()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(11, 0), "Doors")]);
        planner.select_item(ItemRef::CalendarEvent(1), &primary());

        planner.handle_key(Key::Backspace, false);
        assert!(planner.selection().confirm().is_open());
        assert_eq!(planner.store().calendar_events().len(), 1);

        planner.resolve_confirm(ConfirmResult::Confirmed);

        assert!(!planner.selection().is_active());
        assert!(planner.store().calendar_events().is_empty());
    }

    #[test]
    fn test_recolor_failure_reverts() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_calendar_event()
            .times(1)
            .returning(|_, _| Err(anyhow!("timeout")));
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(11, 0), "Doors")]);
        planner.select_item(ItemRef::CalendarEvent(1), &primary());

        planner.handle_key(Key::ArrowRight, false);

        assert_eq!(
            planner.store().calendar_event(1).unwrap().color,
            palette::default_color()
        );
        assert!(!planner.notice().is_open());
    }

    #[test]
    fn test_escape_cancels_active_drag() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_calendar_event().never();
        let mut planner = planner(mock, Vec::new());

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(point_in(&layout, &primary(), at(10, 0)), false, &layout, None);
        planner.pointer_move(point_in(&layout, &primary(), at(12, 0)), false);
        planner.handle_key(Key::Escape, false);
        planner.pointer_up(point_in(&layout, &primary(), at(12, 0)), &layout);

        assert!(matches!(planner.drag().phase(), DragPhase::Idle));
        assert!(planner.store().calendar_events().is_empty());
    }

    #[test]
    fn test_move_commits_new_interval() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_calendar_event()
            .withf(|id, patch| {
                *id == 1 && patch.start_time == Some(at(13, 0)) && patch.end_time == Some(at(14, 0))
            })
            .times(1)
            .returning(|_, _| Ok(calendar_event(1, at(13, 0), at(14, 0), "Doors")));
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(11, 0), "Doors")]);

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(point_in(&layout, &primary(), at(10, 30)), false, &layout, None);
        planner.pointer_move(point_in(&layout, &primary(), at(13, 30)), false);
        planner.pointer_up(point_in(&layout, &primary(), at(13, 30)), &layout);

        assert_eq!(
            planner.store().calendar_event(1).unwrap().interval(),
            Interval::new(at(13, 0), at(14, 0))
        );
    }

    #[test]
    fn test_click_near_parent_end_creates_minimum_item() {
        let mut mock = MockPersistenceService::new();
        mock.expect_create_calendar_event()
            .withf(|req| req.start_time == at(16, 45) && req.end_time == at(17, 0))
            .times(1)
            .returning(|req| Ok(created_event(req, 11)));
        let mut planner = planner(mock, Vec::new());

        click(&mut planner, &primary(), at(16, 55));

        assert_eq!(planner.store().calendar_events().len(), 1);
        assert!(!planner.notice().is_open());
    }

    #[test]
    fn test_set_tag_sends_tag_patch() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_calendar_event()
            .with(eq(1), eq(CalendarEventPatch::tag(Some("talk".into()))))
            .times(1)
            .returning(|_, _| {
                let mut updated = calendar_event(1, at(10, 0), at(11, 0), "Keynote");
                updated.tag = Some("talk".into());
                Ok(updated)
            });
        let mut planner = planner(mock, vec![calendar_event(1, at(10, 0), at(11, 0), "Keynote")]);

        planner.set_tag(1, "  talk ");
        // Unchanged text does not reach the service again.
        planner.set_tag(1, "talk");

        assert_eq!(planner.store().calendar_event(1).unwrap().tag.as_deref(), Some("talk"));
    }

    #[test]
    fn test_blank_location_clears_it() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_calendar_event()
            .with(eq(1), eq(CalendarEventPatch::location(None)))
            .times(1)
            .returning(|_, _| Ok(calendar_event(1, at(10, 0), at(11, 0), "Keynote")));
        let mut event = calendar_event(1, at(10, 0), at(11, 0), "Keynote");
        event.location = Some("Hall A".into());
        let mut planner = planner(mock, vec![event]);

        planner.set_location(ItemRef::CalendarEvent(1), "   ");

        assert_eq!(planner.store().calendar_event(1).unwrap().location, None);
    }

    #[test]
    fn test_task_description_and_location_patches() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_task()
            .with(eq(5), eq(TaskPatch::description(Some("200 badges".into()))))
            .times(1)
            .returning(|_, _| {
                let mut updated = task(5, "Badges");
                updated.description = Some("200 badges".into());
                Ok(updated)
            });
        mock.expect_update_task()
            .with(eq(5), eq(TaskPatch::location(Some("Lobby".into()))))
            .times(1)
            .returning(|_, _| {
                let mut updated = task(5, "Badges");
                updated.description = Some("200 badges".into());
                updated.location = Some("Lobby".into());
                Ok(updated)
            });
        let clock = ManualClock::new(at(9, 0));
        let mut planner = planner_with(mock, Vec::new(), vec![task(5, "Badges")], &clock);

        planner.set_description(5, "200 badges");
        planner.set_location(ItemRef::Task(5), "Lobby");

        let stored = planner.store().task(5).unwrap();
        assert_eq!(stored.description.as_deref(), Some("200 badges"));
        assert_eq!(stored.location.as_deref(), Some("Lobby"));
    }

    #[test]
    fn test_detail_failure_keeps_mirror() {
        let mut mock = MockPersistenceService::new();
        mock.expect_update_task()
            .times(1)
            .returning(|_, _| Err(anyhow!("timeout")));
        let clock = ManualClock::new(at(9, 0));
        let mut planner = planner_with(mock, Vec::new(), vec![task(5, "Badges")], &clock);

        planner.set_location(ItemRef::Task(5), "Lobby");

        assert_eq!(planner.store().task(5).unwrap().location, None);
        assert!(!planner.notice().is_open());
    }

    #[test]
    fn test_tick_reloads_schedule_when_due() {
        let mut mock = MockPersistenceService::new();
        mock.expect_parent_event()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(Some(parent())));
        mock.expect_list_calendar_events()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(vec![calendar_event(4, at(12, 0), at(13, 0), "Lunch")]));
        mock.expect_list_tasks()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let clock = ManualClock::new(at(9, 0));
        let mut planner = planner_with(mock, Vec::new(), Vec::new(), &clock);

        assert!(!planner.tick());
        assert!(planner.store().calendar_events().is_empty());

        clock.advance(Duration::seconds(30));
        assert!(planner.tick());
        assert_eq!(planner.store().calendar_events()[0].title, "Lunch");
    }

    #[test]
    fn test_failed_reload_keeps_mirror() {
        let mut mock = MockPersistenceService::new();
        mock.expect_parent_event().returning(|_| Ok(Some(parent())));
        mock.expect_list_calendar_events().returning(|_| Ok(Vec::new()));
        mock.expect_list_tasks()
            .times(1)
            .returning(|_| Err(anyhow!("database is locked")));
        let clock = ManualClock::new(at(9, 0));
        let mut planner = planner_with(
            mock,
            vec![calendar_event(1, at(10, 0), at(11, 0), "Doors")],
            Vec::new(),
            &clock,
        );

        clock.advance(Duration::seconds(30));
        assert!(!planner.tick());
        assert_eq!(planner.store().calendar_events().len(), 1);
    }

    #[test]
    fn test_tick_skips_reload_during_drag() {
        let mut mock = MockPersistenceService::new();
        mock.expect_list_calendar_events().never();
        let clock = ManualClock::new(at(9, 0));
        let mut planner = planner_with(mock, Vec::new(), Vec::new(), &clock);

        let layout = planner.layout(Pos2::ZERO, 1200.0);
        planner.pointer_down(point_in(&layout, &primary(), at(10, 0)), false, &layout, None);
        clock.advance(Duration::seconds(30));

        assert!(!planner.tick());
    }
}
