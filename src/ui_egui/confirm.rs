//! Confirmation dialog for deleting items, plus the blocking notice shown
//! when an edit is rejected.

use egui::{Context, RichText};

use crate::models::lane::ItemRef;

/// Actions that need an explicit yes before they run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteItem { item: ItemRef, title: String },
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteItem {
                item: ItemRef::CalendarEvent(_),
                ..
            } => "Delete Calendar Event",
            ConfirmAction::DeleteItem {
                item: ItemRef::Task(_),
                ..
            } => "Delete Task",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmAction::DeleteItem { title, .. } if title.trim().is_empty() => {
                "Are you sure you want to delete this untitled item?\n\nThis action cannot be undone."
                    .to_string()
            }
            ConfirmAction::DeleteItem { title, .. } => {
                format!(
                    "Are you sure you want to delete \"{}\"?\n\nThis action cannot be undone.",
                    title
                )
            }
        }
    }

    pub fn confirm_text(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteItem { .. } => "Delete",
        }
    }
}

/// Result of a confirmation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Cancelled,
    /// Dialog is still open
    Pending,
}

#[derive(Debug, Default)]
pub struct ConfirmDialogState {
    pending_action: Option<ConfirmAction>,
}

impl ConfirmDialogState {
    pub fn request(&mut self, action: ConfirmAction) {
        self.pending_action = Some(action);
    }

    pub fn is_open(&self) -> bool {
        self.pending_action.is_some()
    }

    /// Close the dialog with `result`, handing back the action on confirm.
    pub fn resolve(&mut self, result: ConfirmResult) -> Option<ConfirmAction> {
        match result {
            ConfirmResult::Pending => None,
            ConfirmResult::Cancelled => {
                self.pending_action = None;
                None
            }
            ConfirmResult::Confirmed => self.pending_action.take(),
        }
    }

    /// Draw the dialog and report what the user chose this frame.
    pub fn render(&self, ctx: &Context) -> ConfirmResult {
        let Some(action) = &self.pending_action else {
            return ConfirmResult::Pending;
        };

        let mut result = ConfirmResult::Pending;

        egui::Window::new(action.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(300.0);
                ui.set_max_width(400.0);
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("⚠")
                            .size(24.0)
                            .color(egui::Color32::from_rgb(220, 150, 50)),
                    );
                    ui.label(action.message());
                });

                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let confirm_button = egui::Button::new(
                        RichText::new(action.confirm_text()).color(egui::Color32::WHITE),
                    )
                    .fill(egui::Color32::from_rgb(180, 60, 60));

                    if ui.add(confirm_button).clicked() {
                        result = ConfirmResult::Confirmed;
                    }
                    ui.add_space(10.0);
                    if ui.button("Cancel").clicked() {
                        result = ConfirmResult::Cancelled;
                    }
                });
                ui.add_space(5.0);
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            result = ConfirmResult::Cancelled;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            result = ConfirmResult::Confirmed;
        }

        result
    }
}

/// A rejected edit, shown until the user dismisses it.
#[derive(Debug, Default)]
pub struct NoticeState {
    message: Option<String>,
}

impl NoticeState {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn render(&mut self, ctx: &Context) {
        let Some(message) = &self.message else {
            return;
        };

        let mut close = false;
        egui::Window::new("Change not saved")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(280.0);
                ui.add_space(8.0);
                ui.label(message.as_str());
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Enter)) {
            close = true;
        }
        if close {
            self.dismiss();
        }
    }
}
