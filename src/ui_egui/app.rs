mod editor;
mod grid_panel;
mod toolbar;

use egui::{Key, Rect};

use self::editor::DetailDrafts;
use super::planner::Planner;
use crate::models::lane::ItemRef;
use crate::services::persistence::SqlitePersistence;

/// Keys the planner reacts to; everything else stays with egui.
const PLANNER_KEYS: [Key; 7] = [
    Key::Escape,
    Key::Backspace,
    Key::Delete,
    Key::ArrowUp,
    Key::ArrowDown,
    Key::ArrowLeft,
    Key::ArrowRight,
];

pub struct PlannerApp {
    planner: Planner<'static, SqlitePersistence<'static>>,
    /// Editor bounds from the previous frame; presses inside it do not
    /// dismiss the selection.
    editor_rect: Option<Rect>,
    details: DetailDrafts,
    hovered: Option<ItemRef>,
}

impl PlannerApp {
    pub fn new(planner: Planner<'static, SqlitePersistence<'static>>) -> Self {
        Self {
            planner,
            editor_rect: None,
            details: DetailDrafts::default(),
            hovered: None,
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let text_has_focus = ctx.wants_keyboard_input();
        let pressed: Vec<Key> = ctx.input(|i| {
            PLANNER_KEYS
                .iter()
                .copied()
                .filter(|key| i.key_pressed(*key))
                .collect()
        });
        for key in pressed {
            self.planner.handle_key(key, text_has_focus);
        }
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.planner.tick() {
            log::debug!("Refreshed; zoom level now {}", self.planner.zoom().level());
        }

        // Keys first, so an Escape meant for an open dialog is seen by the
        // dialog and not also by the selection.
        self.handle_keys(ctx);
        self.render_toolbar(ctx);
        let selected_rect = self.render_grid(ctx);
        self.render_editor(ctx, selected_rect);

        let result = self.planner.selection().confirm().render(ctx);
        self.planner.resolve_confirm(result);
        self.planner.notice_mut().render(ctx);

        // Keep ticking so the shared poll runs while idle.
        ctx.request_repaint_after(std::time::Duration::from_secs(1));
    }
}
