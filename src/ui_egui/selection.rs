//! Single active selection and the inline editor that follows it.
//!
//! At most one calendar event or one task is selected. Selecting either kind
//! replaces the other. While something is selected a transparent scrim
//! covers the grid; clicking it (outside the editor) clears the selection.

use egui::{Key, Pos2, Rect, Vec2};

use super::confirm::{ConfirmAction, ConfirmDialogState, ConfirmResult};
use super::palette;
use crate::models::lane::{ItemRef, LaneId};

/// Horizontal gap between an item and its editor.
pub const EDITOR_GAP: f32 = 8.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    CalendarEvent {
        id: i64,
    },
    /// A task is selected in one particular column; the same task may also
    /// be shown in other assignees' columns.
    Task {
        id: i64,
        column: LaneId,
    },
}

impl Selection {
    pub fn item(&self) -> Option<ItemRef> {
        match self {
            Selection::None => None,
            Selection::CalendarEvent { id } => Some(ItemRef::CalendarEvent(*id)),
            Selection::Task { id, .. } => Some(ItemRef::Task(*id)),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Whether `item` drawn in `lane` is the selected block.
    pub fn is_selected(&self, item: ItemRef, lane: &LaneId) -> bool {
        match (self, item) {
            (Selection::CalendarEvent { id }, ItemRef::CalendarEvent(other)) => *id == other,
            (Selection::Task { id, column }, ItemRef::Task(other)) => {
                *id == other && column == lane
            }
            _ => false,
        }
    }
}

/// Side effects the caller must carry out against the schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionAction {
    /// The selection was dismissed; the editor lost focus on this item.
    Cleared(ItemRef),
    Recolor { id: i64, color: String },
    ConfirmRequested,
}

#[derive(Debug, Default)]
pub struct SelectionModel {
    selection: Selection,
    draft_title: String,
    confirm: ConfirmDialogState,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_item(&self) -> Option<ItemRef> {
        self.selection.item()
    }

    pub fn is_active(&self) -> bool {
        !self.selection.is_none()
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_title_mut(&mut self) -> &mut String {
        &mut self.draft_title
    }

    pub fn confirm(&self) -> &ConfirmDialogState {
        &self.confirm
    }

    /// Select `item` as shown in `lane`, seeding the editor with `title`.
    /// Returns the previously selected item when it was a different one.
    pub fn select(&mut self, item: ItemRef, lane: &LaneId, title: &str) -> Option<ItemRef> {
        let next = match item {
            ItemRef::CalendarEvent(id) => Selection::CalendarEvent { id },
            ItemRef::Task(id) => Selection::Task {
                id,
                column: lane.clone(),
            },
        };
        if next == self.selection {
            return None;
        }

        let previous = self.selection.item();
        log::debug!("Selected {:?} in {}", item, lane);
        self.selection = next;
        if previous == Some(item) {
            return None;
        }
        self.draft_title = title.to_string();
        previous
    }

    /// Drop the selection, returning the item that was selected.
    pub fn clear(&mut self) -> Option<ItemRef> {
        let previous = self.selection.item();
        self.selection = Selection::None;
        previous
    }

    /// A click on the scrim. Clicks inside the editor keep the selection.
    pub fn scrim_click(&mut self, pos: Pos2, editor: Option<Rect>) -> Option<SelectionAction> {
        if editor.is_some_and(|rect| rect.contains(pos)) {
            return None;
        }
        self.clear().map(SelectionAction::Cleared)
    }

    /// Keyboard handling while something is selected. Ignored while a text
    /// field has focus or the confirm dialog is open.
    pub fn handle_key(
        &mut self,
        key: Key,
        text_has_focus: bool,
        current_color: Option<&str>,
    ) -> Option<SelectionAction> {
        let item = self.selection.item()?;
        if text_has_focus || self.confirm.is_open() {
            return None;
        }

        match key {
            Key::Escape => self.clear().map(SelectionAction::Cleared),
            Key::Backspace | Key::Delete => {
                self.request_delete();
                Some(SelectionAction::ConfirmRequested)
            }
            Key::ArrowRight | Key::ArrowDown | Key::ArrowLeft | Key::ArrowUp => {
                let ItemRef::CalendarEvent(id) = item else {
                    return None;
                };
                let current = current_color?;
                let color = if matches!(key, Key::ArrowRight | Key::ArrowDown) {
                    palette::next_color(current)
                } else {
                    palette::previous_color(current)
                };
                Some(SelectionAction::Recolor { id, color })
            }
            _ => None,
        }
    }

    /// Ask for confirmation before deleting the selected item.
    pub fn request_delete(&mut self) -> bool {
        let Some(item) = self.selection.item() else {
            return false;
        };
        self.confirm.request(ConfirmAction::DeleteItem {
            item,
            title: self.draft_title.clone(),
        });
        true
    }

    /// Resolve the delete confirmation. Returns the item to delete once the
    /// user confirms; the selection is cleared at that point.
    pub fn resolve_confirm(&mut self, result: ConfirmResult) -> Option<ItemRef> {
        let ConfirmAction::DeleteItem { item, .. } = self.confirm.resolve(result)?;
        if self.selection.item() == Some(item) {
            self.selection = Selection::None;
        }
        Some(item)
    }
}

/// Top-left corner for the inline editor next to `item_rect`.
///
/// The editor sits to the right of the item, flips to the left when it
/// would run past the viewport, and is kept vertically inside it.
pub fn editor_anchor(item_rect: Rect, editor_size: Vec2, viewport: Rect) -> Pos2 {
    let mut x = item_rect.right() + EDITOR_GAP;
    if x + editor_size.x > viewport.right() {
        x = item_rect.left() - EDITOR_GAP - editor_size.x;
    }
    x = x.max(viewport.left());

    let max_y = (viewport.bottom() - editor_size.y).max(viewport.top());
    let y = item_rect.top().clamp(viewport.top(), max_y);

    Pos2::new(x, y)
}
