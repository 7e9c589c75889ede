//! Keyboard shortcut mapping.
//!
//! Maps decoded keys to semantic `ShortcutAction`s. Only consulted when no
//! label is being edited; the editor routes keys to the label otherwise.
//!
//! - `1` selection, `2` connector
//! - `3`–`7` place Process, Start, Input/Output, Subprocess, Decision
//! - Delete / Backspace removes the selected entity
//! - Escape clears the selection

use crate::input::Key;
use crate::tools::ToolMode;
use fc_core::model::ShapeKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Tool(ToolMode),
    Delete,
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key press to an action, or `None` if it has no binding.
    pub fn resolve(key: Key) -> Option<ShortcutAction> {
        let tool = match key {
            Key::Digit(1) => ToolMode::Selection,
            Key::Digit(2) => ToolMode::DrawingConnector,
            Key::Digit(3) => ToolMode::PlacingNode(ShapeKind::Process),
            Key::Digit(4) => ToolMode::PlacingNode(ShapeKind::Start),
            Key::Digit(5) => ToolMode::PlacingNode(ShapeKind::InputOutput),
            Key::Digit(6) => ToolMode::PlacingNode(ShapeKind::Subprocess),
            Key::Digit(7) => ToolMode::PlacingNode(ShapeKind::Decision),
            Key::Delete | Key::Backspace => return Some(ShortcutAction::Delete),
            Key::Escape => return Some(ShortcutAction::Deselect),
            _ => return None,
        };
        Some(ShortcutAction::Tool(tool))
    }
}
