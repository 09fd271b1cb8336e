//! Pointer gesture state machine for the time grid.
//!
//! One gesture at a time walks `Idle -> Armed -> Dragging -> Committing ->
//! Idle`. A press arms the controller; moving past the drag threshold starts
//! dragging and produces a [`DragPreview`]; releasing yields a [`DragCommit`]
//! that the caller sends to the schedule store before calling
//! [`DragController::settle`]. The same controller serves track lanes and
//! person columns; the lane decides whether a calendar event or a task is
//! produced.

use chrono::{DateTime, Duration, Utc};
use egui::{Pos2, Rect};

use super::snap::{self, DragMode};
use super::time_axis::TimeAxis;
use crate::models::interval::Interval;
use crate::models::lane::{ItemRef, LaneId, TargetKind};
use crate::utils::date::{ceil_to_hour, floor_to_hour, format_range};

/// Pointer travel (px) that turns a press into a drag.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 5.0;

/// What the controller needs to know about the lanes it drags over.
pub trait LaneResolver {
    /// Window every committed interval is clamped into.
    fn window(&self) -> Interval;
    /// Screen rect of a lane; its top edge sits at the axis origin.
    fn lane_rect(&self, lane: &LaneId) -> Option<Rect>;
    /// Items currently placed in a lane.
    fn lane_items(&self, lane: &LaneId) -> Vec<(ItemRef, Interval)>;
}

/// Edge of an item grabbed for resizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeEdge {
    /// Adjusts the start time
    Top,
    /// Adjusts the end time
    Bottom,
}

/// What the pointer landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    Background,
    Item(ItemRef),
    Edge(ItemRef, ResizeEdge),
}

/// A pointer-down as seen by the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerPress {
    pub pos: Pos2,
    pub lane: LaneId,
    pub target: PressTarget,
    /// Grid-mode modifier (Ctrl/Cmd) held.
    pub modifier: bool,
    /// Some item is selected; creation gestures are suppressed.
    pub selection_active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureKind {
    Create,
    Move {
        item: ItemRef,
        original: Interval,
        /// Distance from the item start to the press instant.
        grab_offset: Duration,
    },
    Resize {
        item: ItemRef,
        edge: ResizeEdge,
        original: Interval,
    },
}

/// Mutable context of one gesture, alive from press to release.
#[derive(Clone, Debug, PartialEq)]
pub struct DragContext {
    pub lane: LaneId,
    pub kind: GestureKind,
    pub mode: DragMode,
    pub press_pos: Pos2,
    pub press_instant: DateTime<Utc>,
    pub current_pos: Pos2,
    pub lane_rect: Rect,
    /// Interval committed by a release without movement.
    pub provisional: Interval,
    pub preview: Option<DragPreview>,
}

/// Transient block drawn while dragging.
#[derive(Clone, Debug, PartialEq)]
pub struct DragPreview {
    pub lane: LaneId,
    pub target: TargetKind,
    pub rect: Rect,
    pub interval: Interval,
    pub label: String,
}

/// Result of a finished gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum DragCommit {
    Create { lane: LaneId, interval: Interval },
    Move { item: ItemRef, interval: Interval },
    Resize { item: ItemRef, interval: Interval },
    /// An item was pressed and released without moving.
    Select { item: ItemRef, lane: LaneId },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragPhase {
    Idle,
    Armed(DragContext),
    Dragging(DragContext),
    Committing(DragCommit),
}

pub struct DragController {
    phase: DragPhase,
    threshold: f32,
    default_duration: Duration,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD, Duration::hours(1))
    }
}

impl DragController {
    pub fn new(threshold: f32, default_duration: Duration) -> Self {
        Self {
            phase: DragPhase::Idle,
            threshold,
            default_duration,
        }
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    pub fn preview(&self) -> Option<&DragPreview> {
        match &self.phase {
            DragPhase::Dragging(context) => context.preview.as_ref(),
            _ => None,
        }
    }

    /// Item being moved or resized, if any.
    pub fn active_item(&self) -> Option<ItemRef> {
        let context = match &self.phase {
            DragPhase::Armed(context) | DragPhase::Dragging(context) => context,
            _ => return None,
        };
        match context.kind {
            GestureKind::Create => None,
            GestureKind::Move { item, .. } | GestureKind::Resize { item, .. } => Some(item),
        }
    }

    /// Arm a gesture. Returns `false` when the press is ignored.
    pub fn pointer_down(
        &mut self,
        press: PointerPress,
        axis: &TimeAxis,
        lanes: &dyn LaneResolver,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        let Some(lane_rect) = lanes.lane_rect(&press.lane) else {
            return false;
        };

        let mode = DragMode::from_modifier(press.modifier);
        let press_instant = axis.instant_for(press.pos.y - lane_rect.top());
        let items = lanes.lane_items(&press.lane);

        let (kind, provisional) = match press.target {
            PressTarget::Background => {
                if press.selection_active {
                    log::debug!("Ignoring create gesture while an item is selected");
                    return false;
                }
                if !lanes.window().contains_instant(press_instant) {
                    return false;
                }
                if items
                    .iter()
                    .any(|(_, interval)| interval.contains_instant(press_instant))
                {
                    log::debug!("Ignoring create gesture inside an existing item");
                    return false;
                }
                let start = snap::anchor_start(press_instant, axis.zoom, mode);
                (
                    GestureKind::Create,
                    Interval::new(start, start + self.default_duration),
                )
            }
            PressTarget::Item(item) => {
                let Some(original) = find_interval(&items, item) else {
                    return false;
                };
                (
                    GestureKind::Move {
                        item,
                        original,
                        grab_offset: press_instant - original.start,
                    },
                    original,
                )
            }
            PressTarget::Edge(item, edge) => {
                let Some(original) = find_interval(&items, item) else {
                    return false;
                };
                (
                    GestureKind::Resize {
                        item,
                        edge,
                        original,
                    },
                    original,
                )
            }
        };

        log::debug!("Armed {:?} gesture on {}", kind, press.lane);
        self.phase = DragPhase::Armed(DragContext {
            lane: press.lane,
            kind,
            mode,
            press_pos: press.pos,
            press_instant,
            current_pos: press.pos,
            lane_rect,
            provisional,
            preview: None,
        });
        true
    }

    /// Track the pointer. Crossing the threshold starts dragging; every move
    /// while dragging refreshes the preview.
    pub fn pointer_move(&mut self, pos: Pos2, modifier: bool, axis: &TimeAxis) {
        let phase = std::mem::replace(&mut self.phase, DragPhase::Idle);
        self.phase = match phase {
            DragPhase::Armed(mut context) => {
                context.current_pos = pos;
                context.mode = DragMode::from_modifier(modifier);
                if context.press_pos.distance(pos) > self.threshold {
                    log::debug!("Gesture on {} started dragging", context.lane);
                    context.preview = Some(build_preview(&context, axis));
                    DragPhase::Dragging(context)
                } else {
                    DragPhase::Armed(context)
                }
            }
            DragPhase::Dragging(mut context) => {
                context.current_pos = pos;
                context.mode = DragMode::from_modifier(modifier);
                context.preview = Some(build_preview(&context, axis));
                DragPhase::Dragging(context)
            }
            other => other,
        };
    }

    /// Finish the gesture. The controller stays in `Committing` until
    /// [`settle`](Self::settle) is called.
    pub fn pointer_up(
        &mut self,
        pos: Pos2,
        axis: &TimeAxis,
        lanes: &dyn LaneResolver,
    ) -> Option<DragCommit> {
        let phase = std::mem::replace(&mut self.phase, DragPhase::Idle);
        let window = lanes.window();

        let commit = match phase {
            DragPhase::Armed(context) => match context.kind {
                GestureKind::Create => Some(DragCommit::Create {
                    interval: clamp_end(context.provisional, &window),
                    lane: context.lane,
                }),
                GestureKind::Move { item, .. } | GestureKind::Resize { item, .. } => {
                    Some(DragCommit::Select {
                        item,
                        lane: context.lane,
                    })
                }
            },
            DragPhase::Dragging(mut context) => {
                context.current_pos = pos;
                let interval = clamp_end(gesture_interval(&context, axis), &window);
                Some(match context.kind {
                    GestureKind::Create => DragCommit::Create {
                        lane: context.lane,
                        interval,
                    },
                    GestureKind::Move { item, .. } => DragCommit::Move { item, interval },
                    GestureKind::Resize { item, .. } => DragCommit::Resize { item, interval },
                })
            }
            other => {
                self.phase = other;
                return None;
            }
        };

        if let Some(commit) = &commit {
            log::debug!("Gesture released: {:?}", commit);
            self.phase = DragPhase::Committing(commit.clone());
        }
        commit
    }

    /// Return to idle once the commit has been handled, whatever its outcome.
    pub fn settle(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Abandon the current gesture without committing.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            log::debug!("Gesture cancelled");
        }
        self.phase = DragPhase::Idle;
    }
}

fn find_interval(items: &[(ItemRef, Interval)], item: ItemRef) -> Option<Interval> {
    items
        .iter()
        .find(|(candidate, _)| *candidate == item)
        .map(|(_, interval)| *interval)
}

/// Clamp the end to the parent window. When that leaves less than the
/// minimum duration, the start is pulled back to fit it.
fn clamp_end(interval: Interval, window: &Interval) -> Interval {
    let end = interval.end.min(window.end);
    if end - interval.start >= snap::min_duration() {
        return Interval::new(interval.start, end);
    }
    let start = (end - snap::min_duration()).max(window.start);
    Interval::new(start, end)
}

/// Interval described by the live pointer position.
fn gesture_interval(context: &DragContext, axis: &TimeAxis) -> Interval {
    let current = axis.instant_for(context.current_pos.y - context.lane_rect.top());
    match &context.kind {
        GestureKind::Create => {
            let (start, end) =
                snap::resolve_span(context.press_instant, current, axis.zoom, context.mode);
            Interval::new(start, end)
        }
        GestureKind::Move {
            original,
            grab_offset,
            ..
        } => {
            let raw_start = current - *grab_offset;
            let start = match context.mode {
                DragMode::Grid => floor_to_hour(raw_start),
                DragMode::Free => snap::magnetize(raw_start, axis.zoom),
            };
            Interval::new(start, start + original.duration())
        }
        GestureKind::Resize { edge, original, .. } => match edge {
            ResizeEdge::Top => {
                let start = match context.mode {
                    DragMode::Grid => floor_to_hour(current),
                    DragMode::Free => snap::snap(current, axis.zoom),
                };
                let latest_start = original.end - snap::min_duration();
                Interval::new(start.min(latest_start), original.end)
            }
            ResizeEdge::Bottom => {
                let end = match context.mode {
                    DragMode::Grid => ceil_to_hour(current),
                    DragMode::Free => snap::snap(current, axis.zoom),
                };
                Interval::new(
                    original.start,
                    snap::enforce_min_duration(original.start, end),
                )
            }
        },
    }
}

fn build_preview(context: &DragContext, axis: &TimeAxis) -> DragPreview {
    let interval = gesture_interval(context, axis);
    let top = context.lane_rect.top() + axis.y_for(interval.start);
    let height = axis.height_of(interval.duration());
    DragPreview {
        lane: context.lane.clone(),
        target: context.lane.target_kind(),
        rect: Rect::from_min_max(
            Pos2::new(context.lane_rect.left(), top),
            Pos2::new(context.lane_rect.right(), top + height),
        ),
        interval,
        label: format_range(interval.start, interval.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
    }

    /// One track lane, 100 px wide, with the axis origin at 09:00 and zoom 99
    /// so that one hour is exactly 100 px.
    struct FakeLanes {
        window: Interval,
        items: Vec<(ItemRef, Interval)>,
    }

    impl FakeLanes {
        fn new() -> Self {
            Self {
                window: Interval::new(at(9, 0), at(17, 0)),
                items: Vec::new(),
            }
        }
    }

    impl LaneResolver for FakeLanes {
        fn window(&self) -> Interval {
            self.window
        }

        fn lane_rect(&self, lane: &LaneId) -> Option<Rect> {
            match lane {
                LaneId::Track(name) if name == "PRIMARY" => Some(Rect::from_min_max(
                    Pos2::new(0.0, 0.0),
                    Pos2::new(100.0, 800.0),
                )),
                LaneId::Person(_) => Some(Rect::from_min_max(
                    Pos2::new(200.0, 0.0),
                    Pos2::new(300.0, 800.0),
                )),
                _ => None,
            }
        }

        fn lane_items(&self, _lane: &LaneId) -> Vec<(ItemRef, Interval)> {
            self.items.clone()
        }
    }

    fn axis() -> TimeAxis {
        TimeAxis::new(at(9, 0), 99)
    }

    fn y_of(instant: DateTime<Utc>) -> f32 {
        axis().y_for(instant)
    }

    fn press(y: f32, target: PressTarget) -> PointerPress {
        PointerPress {
            pos: Pos2::new(50.0, y),
            lane: LaneId::Track("PRIMARY".into()),
            target,
            modifier: false,
            selection_active: false,
        }
    }

    #[test]
    fn test_click_without_movement_commits_default_hour() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();

        let mut p = press(y_of(at(10, 7)), PressTarget::Background);
        p.modifier = true;
        assert!(drag.pointer_down(p, &axis(), &lanes));
        assert!(drag.preview().is_none());

        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(10, 7))), &axis(), &lanes);
        assert_eq!(
            commit,
            Some(DragCommit::Create {
                lane: LaneId::Track("PRIMARY".into()),
                interval: Interval::new(at(10, 0), at(11, 0)),
            })
        );
        assert!(matches!(drag.phase(), DragPhase::Committing(_)));
        drag.settle();
        assert!(drag.is_idle());
    }

    #[test]
    fn test_small_jitter_stays_armed() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        drag.pointer_down(press(100.0, PressTarget::Background), &axis(), &lanes);

        drag.pointer_move(Pos2::new(53.0, 104.0), false, &axis());
        assert!(matches!(drag.phase(), DragPhase::Armed(_)));

        drag.pointer_move(Pos2::new(53.0, 105.0), false, &axis());
        assert!(drag.is_dragging());
        assert!(drag.preview().is_some());
    }

    #[test]
    fn test_drag_create_snaps_and_previews() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        drag.pointer_down(press(y_of(at(10, 7)), PressTarget::Background), &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(11, 52))), false, &axis());

        let preview = drag.preview().unwrap();
        assert_eq!(preview.interval, Interval::new(at(10, 0), at(11, 45)));
        assert_eq!(preview.label, "10:00 - 11:45");
        assert_eq!(preview.target, TargetKind::CalendarEvent);
        assert!((preview.rect.top() - 100.0).abs() < 0.01);
        assert!((preview.rect.height() - 175.0).abs() < 0.01);
        assert_eq!(preview.rect.width(), 100.0);
    }

    #[test]
    fn test_upward_drag_is_reordered() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        drag.pointer_down(press(y_of(at(12, 0)), PressTarget::Background), &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(10, 30))), false, &axis());

        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(10, 30))), &axis(), &lanes);
        assert_eq!(
            commit,
            Some(DragCommit::Create {
                lane: LaneId::Track("PRIMARY".into()),
                interval: Interval::new(at(10, 30), at(12, 0)),
            })
        );
    }

    #[test]
    fn test_commit_clamps_to_parent_end() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        drag.pointer_down(press(y_of(at(16, 30)), PressTarget::Background), &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(18, 0))), false, &axis());

        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(18, 0))), &axis(), &lanes);
        assert_eq!(
            commit,
            Some(DragCommit::Create {
                lane: LaneId::Track("PRIMARY".into()),
                interval: Interval::new(at(16, 30), at(17, 0)),
            })
        );
    }

    #[test]
    fn test_click_near_parent_end_keeps_minimum_duration() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        assert!(drag.pointer_down(press(y_of(at(16, 55)), PressTarget::Background), &axis(), &lanes));

        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(16, 55))), &axis(), &lanes);
        assert_eq!(
            commit,
            Some(DragCommit::Create {
                lane: LaneId::Track("PRIMARY".into()),
                interval: Interval::new(at(16, 45), at(17, 0)),
            })
        );
    }

    #[test]
    fn test_grid_mode_drag_aligns_to_hours() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        let mut p = press(y_of(at(10, 20)), PressTarget::Background);
        p.modifier = true;
        drag.pointer_down(p, &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(12, 10))), true, &axis());

        assert_eq!(
            drag.preview().unwrap().interval,
            Interval::new(at(10, 0), at(13, 0))
        );
    }

    #[test]
    fn test_press_inside_existing_item_is_ignored() {
        let mut lanes = FakeLanes::new();
        lanes.items = vec![(ItemRef::CalendarEvent(1), Interval::new(at(10, 0), at(11, 0)))];
        let mut drag = DragController::default();

        assert!(!drag.pointer_down(press(y_of(at(10, 30)), PressTarget::Background), &axis(), &lanes));
        assert!(drag.is_idle());
    }

    #[test]
    fn test_selection_suppresses_creation() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        let mut p = press(y_of(at(10, 0)), PressTarget::Background);
        p.selection_active = true;

        assert!(!drag.pointer_down(p, &axis(), &lanes));
    }

    #[test]
    fn test_second_press_ignored_while_active() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        assert!(drag.pointer_down(press(y_of(at(10, 0)), PressTarget::Background), &axis(), &lanes));
        assert!(!drag.pointer_down(press(y_of(at(12, 0)), PressTarget::Background), &axis(), &lanes));
    }

    #[test]
    fn test_move_preserves_duration() {
        let mut lanes = FakeLanes::new();
        let item = ItemRef::CalendarEvent(3);
        lanes.items = vec![(item, Interval::new(at(10, 0), at(11, 30)))];
        let mut drag = DragController::default();

        drag.pointer_down(press(y_of(at(10, 30)), PressTarget::Item(item)), &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(13, 31))), false, &axis());
        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(13, 31))), &axis(), &lanes);

        assert_eq!(
            commit,
            Some(DragCommit::Move {
                item,
                interval: Interval::new(at(13, 0), at(14, 30)),
            })
        );
    }

    #[test]
    fn test_item_click_selects() {
        let mut lanes = FakeLanes::new();
        let item = ItemRef::CalendarEvent(3);
        lanes.items = vec![(item, Interval::new(at(10, 0), at(11, 0)))];
        let mut drag = DragController::default();

        drag.pointer_down(press(y_of(at(10, 30)), PressTarget::Item(item)), &axis(), &lanes);
        assert_eq!(drag.active_item(), Some(item));
        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(10, 30))), &axis(), &lanes);

        assert_eq!(
            commit,
            Some(DragCommit::Select {
                item,
                lane: LaneId::Track("PRIMARY".into()),
            })
        );
    }

    #[test]
    fn test_resize_bottom_keeps_minimum_duration() {
        let mut lanes = FakeLanes::new();
        let item = ItemRef::CalendarEvent(3);
        lanes.items = vec![(item, Interval::new(at(10, 0), at(11, 0)))];
        let mut drag = DragController::default();

        drag.pointer_down(
            press(y_of(at(11, 0)), PressTarget::Edge(item, ResizeEdge::Bottom)),
            &axis(),
            &lanes,
        );
        drag.pointer_move(Pos2::new(50.0, y_of(at(9, 30))), false, &axis());

        assert_eq!(
            drag.preview().unwrap().interval,
            Interval::new(at(10, 0), at(10, 15))
        );
    }

    #[test]
    fn test_resize_top_in_grid_mode() {
        let mut lanes = FakeLanes::new();
        let item = ItemRef::CalendarEvent(3);
        lanes.items = vec![(item, Interval::new(at(12, 0), at(14, 0)))];
        let mut drag = DragController::default();

        let mut p = press(y_of(at(12, 0)), PressTarget::Edge(item, ResizeEdge::Top));
        p.modifier = true;
        drag.pointer_down(p, &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, y_of(at(10, 40))), true, &axis());
        let commit = drag.pointer_up(Pos2::new(50.0, y_of(at(10, 40))), &axis(), &lanes);

        assert_eq!(
            commit,
            Some(DragCommit::Resize {
                item,
                interval: Interval::new(at(10, 0), at(14, 0)),
            })
        );
    }

    #[test]
    fn test_task_lane_previews_task() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        let p = PointerPress {
            pos: Pos2::new(250.0, y_of(at(9, 0))),
            lane: LaneId::Person("you@localhost".into()),
            target: PressTarget::Background,
            modifier: false,
            selection_active: false,
        };
        drag.pointer_down(p, &axis(), &lanes);
        drag.pointer_move(Pos2::new(250.0, y_of(at(10, 0))), false, &axis());

        let preview = drag.preview().unwrap();
        assert_eq!(preview.target, TargetKind::Task);
        assert_eq!(preview.rect.left(), 200.0);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let lanes = FakeLanes::new();
        let mut drag = DragController::default();
        drag.pointer_down(press(100.0, PressTarget::Background), &axis(), &lanes);
        drag.pointer_move(Pos2::new(50.0, 300.0), false, &axis());

        drag.cancel();

        assert!(drag.is_idle());
        assert!(drag.pointer_up(Pos2::new(50.0, 300.0), &axis(), &lanes).is_none());
    }
}
