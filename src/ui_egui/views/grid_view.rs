//! The run-of-show grid: hour rows down the side, track lanes and person
//! columns across the top.
//!
//! [`GridLayout::compute`] turns the schedule into positioned rectangles
//! without touching egui state, so hit testing and geometry can be checked
//! in isolation; [`paint`] draws a computed layout.

use chrono::Duration;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use crate::models::interval::Interval;
use crate::models::lane::{ItemRef, LaneId, TargetKind};
use crate::services::schedule::LaneEntry;
use crate::ui_egui::drag::{DragPreview, PressTarget, ResizeEdge};
use crate::ui_egui::overlap::{layout_lane, LayoutInput};
use crate::ui_egui::palette;
use crate::ui_egui::selection::Selection;
use crate::ui_egui::time_axis::TimeAxis;
use crate::utils::date::{ceil_to_hour, format_clock, format_range};

pub const TIME_LABEL_WIDTH: f32 = 56.0;
pub const HEADER_HEIGHT: f32 = 28.0;
pub const LANE_SPACING: f32 = 4.0;
pub const MIN_LANE_WIDTH: f32 = 140.0;
/// Gap between the last track lane and the first person column.
pub const SECTION_GAP: f32 = 16.0;
/// Blocks shorter than this split into top and bottom resize halves.
pub const SMALL_BLOCK_HEIGHT: f32 = 50.0;
pub const EDGE_ZONE_HEIGHT: f32 = 20.0;

/// One lane with its header and the items it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneColumn {
    pub lane: LaneId,
    pub header: String,
    pub entries: Vec<LaneEntry>,
}

pub struct GridInput<'a> {
    /// Screen position of the grid's top-left corner.
    pub origin: Pos2,
    pub width: f32,
    pub axis: TimeAxis,
    pub window: Interval,
    pub columns: &'a [LaneColumn],
    pub selection: &'a Selection,
    /// Item being moved or resized; drawn faded under the preview.
    pub active_item: Option<ItemRef>,
    pub preview: Option<&'a DragPreview>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourCell {
    pub rect: Rect,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneRect {
    pub lane: LaneId,
    pub header: String,
    pub header_rect: Rect,
    /// Lane body; its top edge is the axis origin.
    pub body: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub item: ItemRef,
    pub lane: LaneId,
    pub rect: Rect,
    pub title: String,
    pub time_label: String,
    pub fill: Color32,
    pub selected: bool,
    pub faded: bool,
}

/// Resize zones of a timed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleZones {
    pub top: Rect,
    pub bottom: Rect,
}

impl HandleZones {
    /// Small blocks split into halves; larger ones get fixed edge bands.
    pub fn for_block(rect: Rect) -> Self {
        let zone_height = if rect.height() < SMALL_BLOCK_HEIGHT {
            rect.height() / 2.0
        } else {
            EDGE_ZONE_HEIGHT
        };
        Self {
            top: Rect::from_min_size(rect.min, Vec2::new(rect.width(), zone_height)),
            bottom: Rect::from_min_size(
                Pos2::new(rect.left(), rect.bottom() - zone_height),
                Vec2::new(rect.width(), zone_height),
            ),
        }
    }

    pub fn edge_at(&self, pos: Pos2) -> Option<ResizeEdge> {
        if self.top.contains(pos) {
            Some(ResizeEdge::Top)
        } else if self.bottom.contains(pos) {
            Some(ResizeEdge::Bottom)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub hours: Vec<HourCell>,
    pub lanes: Vec<LaneRect>,
    pub blocks: Vec<ItemBlock>,
    /// Parts of the grid before the window opens or after it closes.
    pub shaded: Vec<Rect>,
    pub preview: Option<DragPreview>,
    pub content_rect: Rect,
}

impl GridLayout {
    pub fn compute(input: &GridInput) -> Self {
        let axis = input.axis;
        let body_top = input.origin.y + HEADER_HEIGHT;
        let grid_end = ceil_to_hour(input.window.end);
        let content_height = axis.y_for(grid_end).max(0.0);

        let lanes = lane_rects(input, body_top, content_height);
        let right = lanes
            .last()
            .map(|l| l.body.right())
            .unwrap_or(input.origin.x + TIME_LABEL_WIDTH)
            .max(input.origin.x + input.width);
        let content_rect = Rect::from_min_max(
            input.origin,
            Pos2::new(right, body_top + content_height),
        );

        let mut hours = Vec::new();
        let mut hour = axis.origin;
        while hour < grid_end {
            let top = body_top + axis.y_for(hour);
            hours.push(HourCell {
                rect: Rect::from_min_size(
                    Pos2::new(input.origin.x, top),
                    Vec2::new(right - input.origin.x, axis.height_of(Duration::hours(1))),
                ),
                label: format_clock(hour),
            });
            hour += Duration::hours(1);
        }

        let grid_left = input.origin.x + TIME_LABEL_WIDTH;
        let window_top = body_top + axis.y_for(input.window.start);
        let window_bottom = body_top + axis.y_for(input.window.end);
        let mut shaded = Vec::new();
        if window_top > body_top {
            shaded.push(Rect::from_min_max(
                Pos2::new(grid_left, body_top),
                Pos2::new(right, window_top),
            ));
        }
        if window_bottom < content_rect.bottom() {
            shaded.push(Rect::from_min_max(
                Pos2::new(grid_left, window_bottom),
                Pos2::new(right, content_rect.bottom()),
            ));
        }

        let mut blocks = Vec::new();
        for (column, lane) in input.columns.iter().zip(&lanes) {
            let inputs: Vec<LayoutInput> = column
                .entries
                .iter()
                .map(|entry| LayoutInput {
                    id: entry.item.id(),
                    interval: entry.interval,
                })
                .collect();

            for placement in layout_lane(&inputs, &input.window) {
                let Some(entry) = column
                    .entries
                    .iter()
                    .find(|e| e.item.id() == placement.id)
                else {
                    continue;
                };
                let lane_width = lane.body.width();
                let left = lane.body.left() + lane_width * placement.offset_fraction() + 1.0;
                let width = (lane_width * placement.width_fraction() - 2.0).max(1.0);
                let top = lane.body.top() + axis.y_for(placement.interval.start);
                let height = axis.height_of(placement.interval.duration()).max(1.0);

                blocks.push(ItemBlock {
                    item: entry.item,
                    lane: lane.lane.clone(),
                    rect: Rect::from_min_size(Pos2::new(left, top), Vec2::new(width, height)),
                    title: entry.title.clone(),
                    time_label: format_range(entry.interval.start, entry.interval.end),
                    fill: block_fill(entry),
                    selected: input.selection.is_selected(entry.item, &lane.lane),
                    faded: input.active_item == Some(entry.item),
                });
            }
        }

        Self {
            hours,
            lanes,
            blocks,
            shaded,
            preview: input.preview.cloned(),
            content_rect,
        }
    }

    pub fn lane_rect(&self, lane: &LaneId) -> Option<Rect> {
        self.lanes.iter().find(|l| &l.lane == lane).map(|l| l.body)
    }

    pub fn block(&self, item: ItemRef, lane: &LaneId) -> Option<&ItemBlock> {
        self.blocks
            .iter()
            .find(|b| b.item == item && &b.lane == lane)
    }

    /// Resolve a pointer position to a lane and what lies under it there.
    pub fn hit_test(&self, pos: Pos2) -> Option<(LaneId, PressTarget)> {
        let lane = self.lanes.iter().find(|l| l.body.contains(pos))?;

        let hit = self
            .blocks
            .iter()
            .rev()
            .find(|b| b.lane == lane.lane && b.rect.contains(pos));
        let target = match hit {
            None => PressTarget::Background,
            Some(block) => match HandleZones::for_block(block.rect).edge_at(pos) {
                Some(edge) => PressTarget::Edge(block.item, edge),
                None => PressTarget::Item(block.item),
            },
        };
        Some((lane.lane.clone(), target))
    }
}

fn lane_rects(input: &GridInput, body_top: f32, content_height: f32) -> Vec<LaneRect> {
    let count = input.columns.len();
    if count == 0 {
        return Vec::new();
    }
    let has_tracks = input
        .columns
        .iter()
        .any(|c| c.lane.target_kind() == TargetKind::CalendarEvent);
    let has_people = input
        .columns
        .iter()
        .any(|c| c.lane.target_kind() == TargetKind::Task);
    let gap = if has_tracks && has_people {
        SECTION_GAP
    } else {
        0.0
    };

    let available = input.width - TIME_LABEL_WIDTH - LANE_SPACING * count as f32 - gap;
    let lane_width = (available / count as f32).max(MIN_LANE_WIDTH);

    let mut x = input.origin.x + TIME_LABEL_WIDTH + LANE_SPACING;
    let mut previous_kind = None;
    input
        .columns
        .iter()
        .map(|column| {
            let kind = column.lane.target_kind();
            if previous_kind == Some(TargetKind::CalendarEvent) && kind == TargetKind::Task {
                x += gap;
            }
            previous_kind = Some(kind);

            let lane = LaneRect {
                lane: column.lane.clone(),
                header: column.header.clone(),
                header_rect: Rect::from_min_size(
                    Pos2::new(x, input.origin.y),
                    Vec2::new(lane_width, HEADER_HEIGHT),
                ),
                body: Rect::from_min_size(
                    Pos2::new(x, body_top),
                    Vec2::new(lane_width, content_height),
                ),
            };
            x += lane_width + LANE_SPACING;
            lane
        })
        .collect()
}

fn block_fill(entry: &LaneEntry) -> Color32 {
    match entry.item {
        ItemRef::Task(_) => palette::TASK_COLOR,
        ItemRef::CalendarEvent(_) => entry
            .color
            .as_deref()
            .and_then(palette::to_color32)
            .unwrap_or_else(palette::default_fill),
    }
}

/// Draw a computed layout. `hovered` exposes resize handles on that block.
pub fn paint(painter: &Painter, layout: &GridLayout, hovered: Option<ItemRef>) {
    let visuals = painter.ctx().style().visuals.clone();
    let line_color = visuals.widgets.noninteractive.bg_stroke.color;
    let text_color = visuals.text_color();
    let weak_text = visuals.weak_text_color();

    for (index, hour) in layout.hours.iter().enumerate() {
        if index % 2 == 1 {
            painter.rect_filled(hour.rect, 0.0, visuals.faint_bg_color);
        }
        painter.line_segment(
            [hour.rect.left_top(), hour.rect.right_top()],
            Stroke::new(1.0, line_color),
        );
        painter.text(
            Pos2::new(hour.rect.left() + TIME_LABEL_WIDTH - 6.0, hour.rect.top() + 2.0),
            Align2::RIGHT_TOP,
            &hour.label,
            FontId::proportional(12.0),
            weak_text,
        );
    }

    for rect in &layout.shaded {
        painter.rect_filled(*rect, 0.0, Color32::from_black_alpha(40));
    }

    for lane in &layout.lanes {
        painter.line_segment(
            [lane.body.left_top(), lane.body.left_bottom()],
            Stroke::new(1.0, line_color),
        );
        painter.rect_filled(lane.header_rect, 2.0, visuals.extreme_bg_color);
        painter.text(
            lane.header_rect.center(),
            Align2::CENTER_CENTER,
            &lane.header,
            FontId::proportional(13.0),
            text_color,
        );
    }

    for block in &layout.blocks {
        paint_block(painter, block, hovered == Some(block.item));
    }

    if let Some(preview) = &layout.preview {
        let fill = match preview.target {
            TargetKind::CalendarEvent => palette::default_fill(),
            TargetKind::Task => palette::TASK_COLOR,
        };
        painter.rect_filled(preview.rect, 4.0, fill.gamma_multiply(0.5));
        painter.rect_stroke(preview.rect, 4.0, Stroke::new(1.5, fill));
        painter.text(
            preview.rect.left_top() + Vec2::new(6.0, 4.0),
            Align2::LEFT_TOP,
            &preview.label,
            FontId::proportional(11.0),
            Color32::WHITE,
        );
    }
}

fn paint_block(painter: &Painter, block: &ItemBlock, hovered: bool) {
    let fill = if block.faded {
        block.fill.gamma_multiply(0.35)
    } else {
        block.fill
    };
    painter.rect_filled(block.rect, 4.0, fill);

    let accent = Rect::from_min_size(block.rect.min, Vec2::new(4.0, block.rect.height()));
    painter.rect_filled(accent, 2.0, fill.linear_multiply(0.7));

    if block.selected {
        painter.rect_stroke(block.rect, 4.0, Stroke::new(2.0, Color32::WHITE));
    }

    let clipped = painter.with_clip_rect(block.rect.shrink(1.0));
    let text_left = accent.right() + 5.0;
    let text_width = (block.rect.right() - text_left - 4.0).max(1.0);
    clipped.text(
        Pos2::new(text_left, block.rect.top() + 2.0),
        Align2::LEFT_TOP,
        &block.time_label,
        FontId::proportional(10.0),
        Color32::WHITE,
    );
    let title = if block.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        block.title.clone()
    };
    let galley = clipped.layout(title, FontId::proportional(13.0), Color32::WHITE, text_width);
    clipped.galley(
        Pos2::new(text_left, block.rect.top() + 14.0),
        galley,
        Color32::WHITE,
    );

    if (block.selected || hovered) && !block.faded {
        let zones = HandleZones::for_block(block.rect);
        let handle = Color32::from_white_alpha(180);
        for y in [zones.top.top() + 2.0, zones.bottom.bottom() - 2.0] {
            painter.line_segment(
                [
                    Pos2::new(block.rect.center().x - 10.0, y),
                    Pos2::new(block.rect.center().x + 10.0, y),
                ],
                Stroke::new(2.0, handle),
            );
        }
    }
}
