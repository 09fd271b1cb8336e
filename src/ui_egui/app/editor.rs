use egui::{Color32, Key, Rect, RichText, Sense, Stroke, Vec2};

use super::PlannerApp;
use crate::models::lane::ItemRef;
use crate::services::persistence::PersistenceService;
use crate::services::schedule::ScheduleStore;
use crate::ui_egui::planner::Planner;
use crate::ui_egui::palette::{format_rgb, PALETTE};
use crate::ui_egui::selection::editor_anchor;
use crate::utils::date::format_range;

const EDITOR_SIZE: Vec2 = Vec2::new(260.0, 230.0);
const SWATCH_SIZE: Vec2 = Vec2::new(18.0, 18.0);

enum EditorAction {
    SaveTitle,
    SaveDetails,
    Recolor(String),
    Delete,
    Close,
}

/// Text of the editor's detail fields for the item it was opened on.
#[derive(Debug, Default)]
pub(super) struct DetailDrafts {
    item: Option<ItemRef>,
    tag: String,
    location: String,
    description: String,
}

impl DetailDrafts {
    /// Seed the fields from the store when the editor moves to a new item.
    fn sync<P: PersistenceService>(&mut self, item: ItemRef, store: &ScheduleStore<P>) {
        if self.item == Some(item) {
            return;
        }
        *self = Self {
            item: Some(item),
            ..Self::default()
        };
        match item {
            ItemRef::CalendarEvent(id) => {
                if let Some(event) = store.calendar_event(id) {
                    self.tag = event.tag.clone().unwrap_or_default();
                    self.location = event.location.clone().unwrap_or_default();
                }
            }
            ItemRef::Task(id) => {
                if let Some(task) = store.task(id) {
                    self.description = task.description.clone().unwrap_or_default();
                    self.location = task.location.clone().unwrap_or_default();
                }
            }
        }
    }

    /// Send every field for `item`; the planner skips unchanged ones.
    fn save<P: PersistenceService>(&self, item: ItemRef, planner: &mut Planner<'_, P>) {
        match item {
            ItemRef::CalendarEvent(id) => planner.set_tag(id, &self.tag),
            ItemRef::Task(id) => planner.set_description(id, &self.description),
        }
        planner.set_location(item, &self.location);
    }

    /// Save whatever was typed before the selection went away.
    pub(super) fn flush<P: PersistenceService>(&mut self, planner: &mut Planner<'_, P>) {
        if let Some(item) = self.item.take() {
            self.save(item, planner);
        }
    }
}

fn detail_field(ui: &mut egui::Ui, text: &mut String, hint: &str, rows: usize) -> bool {
    let edit = if rows > 1 {
        egui::TextEdit::multiline(text).desired_rows(rows)
    } else {
        egui::TextEdit::singleline(text)
    };
    ui.add(edit.hint_text(hint).desired_width(f32::INFINITY))
        .lost_focus()
}

impl PlannerApp {
    /// Inline editor beside the selected block.
    pub(super) fn render_editor(&mut self, ctx: &egui::Context, item_rect: Option<Rect>) {
        let (Some(item), Some(item_rect)) = (self.planner.selection().selected_item(), item_rect)
        else {
            self.details.flush(&mut self.planner);
            self.editor_rect = None;
            return;
        };

        if self.details.item != Some(item) {
            self.details.flush(&mut self.planner);
        }
        self.details.sync(item, self.planner.store());
        let store = self.planner.store();
        let time_label = store
            .item_interval(item)
            .map(|interval| format_range(interval.start, interval.end))
            .unwrap_or_default();
        let current_color = match item {
            ItemRef::CalendarEvent(id) => store.calendar_event(id).map(|e| e.color.clone()),
            ItemRef::Task(_) => None,
        };

        let pos = editor_anchor(item_rect, EDITOR_SIZE, ctx.screen_rect());
        let mut actions = Vec::new();

        let response = egui::Area::new(egui::Id::new("item_editor"))
            .order(egui::Order::Foreground)
            .fixed_pos(pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(EDITOR_SIZE.x - 16.0);

                    let title = ui.add(
                        egui::TextEdit::singleline(self.planner.draft_title_mut())
                            .hint_text("Title")
                            .desired_width(f32::INFINITY),
                    );
                    if title.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        actions.push(EditorAction::SaveTitle);
                    }
                    ui.label(RichText::new(time_label).weak());

                    let details = &mut self.details;
                    let mut lost_focus = match item {
                        ItemRef::CalendarEvent(_) => detail_field(ui, &mut details.tag, "Tag", 1),
                        ItemRef::Task(_) => {
                            detail_field(ui, &mut details.description, "Description", 2)
                        }
                    };
                    lost_focus |= detail_field(ui, &mut details.location, "Location", 1);
                    if lost_focus {
                        actions.push(EditorAction::SaveDetails);
                    }

                    if let Some(current) = &current_color {
                        ui.horizontal(|ui| {
                            for rgb in PALETTE {
                                let color = format_rgb(rgb);
                                let (rect, swatch) = ui.allocate_exact_size(SWATCH_SIZE, Sense::click());
                                let (r, g, b) = rgb;
                                ui.painter()
                                    .rect_filled(rect, 3.0, Color32::from_rgb(r, g, b));
                                if *current == color {
                                    ui.painter().rect_stroke(
                                        rect,
                                        3.0,
                                        Stroke::new(2.0, ui.visuals().strong_text_color()),
                                    );
                                }
                                if swatch.clicked() {
                                    actions.push(EditorAction::Recolor(color));
                                }
                            }
                        });
                    }

                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            actions.push(EditorAction::Delete);
                        }
                        if ui.button("Done").clicked() {
                            actions.push(EditorAction::Close);
                        }
                    });
                });
            });
        self.editor_rect = Some(response.response.rect);

        for action in actions {
            match action {
                EditorAction::SaveTitle => self.planner.commit_title(),
                EditorAction::SaveDetails => self.details.save(item, &mut self.planner),
                EditorAction::Recolor(color) => self.planner.recolor_selected(&color),
                EditorAction::Delete => self.planner.request_delete(),
                EditorAction::Close => {
                    self.details.flush(&mut self.planner);
                    self.planner.close_editor();
                    self.editor_rect = None;
                }
            }
        }
    }
}
