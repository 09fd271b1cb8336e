use egui::{Color32, RichText, Sense, Stroke, Vec2};

use super::PlannerApp;
use crate::models::settings::{MAX_ZOOM, MIN_ZOOM};

const DRAG_BAR_SIZE: Vec2 = Vec2::new(90.0, 16.0);

impl PlannerApp {
    pub(super) fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("planner_toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let parent = self.planner.store().parent();
                ui.heading(&parent.name);
                ui.label(
                    RichText::new(format!(
                        "{} - {}",
                        parent.start_time.format("%b %d %H:%M"),
                        parent.end_time.format("%b %d %H:%M")
                    ))
                    .weak(),
                );
                ui.separator();

                let mut level = self.planner.zoom().level();
                if ui
                    .add(egui::Slider::new(&mut level, MIN_ZOOM..=MAX_ZOOM).text("Zoom"))
                    .changed()
                {
                    self.planner.zoom_mut().apply_slider(level);
                }

                let (rect, response) = ui.allocate_exact_size(DRAG_BAR_SIZE, Sense::drag());
                if response.dragged() {
                    self.planner
                        .zoom_mut()
                        .apply_drag_bar(response.drag_delta().x);
                }
                let fraction = (self.planner.zoom().level() - MIN_ZOOM) as f32
                    / (MAX_ZOOM - MIN_ZOOM) as f32;
                let painter = ui.painter_at(rect);
                let visuals = ui.visuals();
                painter.rect_filled(rect, 3.0, visuals.extreme_bg_color);
                let mut filled = rect;
                filled.set_width(rect.width() * fraction);
                painter.rect_filled(filled, 3.0, visuals.selection.bg_fill);
                painter.rect_stroke(rect, 3.0, Stroke::new(1.0, Color32::GRAY));
                response
                    .on_hover_cursor(egui::CursorIcon::ResizeHorizontal)
                    .on_hover_text("Drag to zoom");

                ui.separator();
                ui.label(
                    RichText::new("Drag to create, hold Ctrl for whole hours, Ctrl+wheel to zoom")
                        .weak(),
                );
            });
        });
    }
}
