use egui::{Rect, Sense};

use super::PlannerApp;
use crate::ui_egui::drag::PressTarget;
use crate::ui_egui::views::grid_view::{paint, GridLayout};

/// egui folds Ctrl+wheel into a zoom factor of `exp(points / 200)`.
const WHEEL_POINTS_PER_ZOOM: f32 = 200.0;

impl PlannerApp {
    /// Draw the grid and feed it pointer input. Returns the selected block's
    /// rect so the editor can be placed next to it.
    pub(super) fn render_grid(&mut self, ctx: &egui::Context) -> Option<Rect> {
        let mut selected = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.handle_wheel_zoom(ui);

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .drag_to_scroll(false)
                .show(ui, |ui| {
                    let origin = ui.cursor().min;
                    let width = ui.available_width();

                    let layout = self.planner.layout(origin, width);
                    let (rect, response) =
                        ui.allocate_exact_size(layout.content_rect.size(), Sense::click_and_drag());
                    self.route_pointer(ui.ctx(), &layout, response.hovered());

                    // Lay out again so the preview follows this frame's pointer.
                    let layout = self.planner.layout(origin, width);
                    paint(&ui.painter_at(rect), &layout, self.hovered);
                    selected = layout.blocks.iter().find(|b| b.selected).map(|b| b.rect);
                });
        });

        selected
    }

    fn handle_wheel_zoom(&mut self, ui: &egui::Ui) {
        if !ui.rect_contains_pointer(ui.max_rect()) {
            return;
        }
        let (held, factor) = ui.input(|i| (i.modifiers.command, i.zoom_delta()));
        if held && factor != 1.0 {
            self.planner
                .zoom_mut()
                .apply_wheel(factor.ln() * WHEEL_POINTS_PER_ZOOM);
        }
    }

    fn route_pointer(&mut self, ctx: &egui::Context, layout: &GridLayout, grid_hovered: bool) {
        let (pos, pressed, released, modifier) = ctx.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.modifiers.command,
            )
        });
        let Some(pos) = pos else {
            return;
        };

        let hit = layout.hit_test(pos).map(|(_, target)| target);
        self.hovered = match hit {
            Some(PressTarget::Item(item)) | Some(PressTarget::Edge(item, _)) => Some(item),
            _ => None,
        };
        if matches!(hit, Some(PressTarget::Edge(..))) && !self.planner.selection().is_active() {
            ctx.set_cursor_icon(egui::CursorIcon::ResizeVertical);
        }

        if pressed && (grid_hovered || self.planner.selection().is_active()) {
            self.planner
                .pointer_down(pos, modifier, layout, self.editor_rect);
        }
        if !self.planner.drag().is_idle() {
            self.planner.pointer_move(pos, modifier);
            if released {
                self.planner.pointer_up(pos, layout);
            }
        }
    }
}
