//! Keyboard shortcut dispatch.
//!
//! Chords resolve to [`CanvasAction`]s only while the canvas is editable and
//! focused. Anything else is dropped on the spot, never queued.

use crate::{Key, KeyEvent, ShapeKind};

/// Distance an arrow key moves the selected element, in base pixels.
pub const NUDGE_STEP: f32 = 1.0;

/// An action a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    /// Add a text element.
    AddText,
    /// Add a shape element.
    AddShape(ShapeKind),
    /// Copy the selected element.
    Copy,
    /// Paste the clipboard.
    Paste,
    /// Copy and paste the selected element in one step.
    Duplicate,
    /// Delete the selected element.
    DeleteSelected,
    /// Move the selected element.
    Nudge {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Key name as shown to users.
    pub key: &'static str,
    /// Whether Control (or Command) is required.
    pub ctrl: bool,
    /// Description shown in help listings.
    pub description: &'static str,
}

impl Shortcut {
    const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+T").
    #[must_use]
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Maps key events to canvas actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcutDispatcher;

impl ShortcutDispatcher {
    /// All shortcuts the dispatcher understands.
    #[must_use]
    pub fn shortcuts() -> Vec<Shortcut> {
        vec![
            Shortcut::new("T", true, "Add text"),
            Shortcut::new("R", true, "Add rectangle"),
            Shortcut::new("O", true, "Add circle"),
            Shortcut::new("C", true, "Copy selected element"),
            Shortcut::new("V", true, "Paste"),
            Shortcut::new("D", true, "Duplicate selected element"),
            Shortcut::new("Delete", false, "Delete selected element"),
            Shortcut::new("Backspace", false, "Delete selected element"),
            Shortcut::new("Arrows", false, "Nudge selected element"),
        ]
    }

    /// Resolve a key event to an action, ignoring gating.
    #[must_use]
    pub fn resolve(event: &KeyEvent) -> Option<CanvasAction> {
        let command = event.modifiers.command();
        match event.key {
            Key::Char(c) if command => match c.to_ascii_lowercase() {
                't' => Some(CanvasAction::AddText),
                'r' => Some(CanvasAction::AddShape(ShapeKind::Rect)),
                'o' => Some(CanvasAction::AddShape(ShapeKind::Circle)),
                'c' => Some(CanvasAction::Copy),
                'v' => Some(CanvasAction::Paste),
                'd' => Some(CanvasAction::Duplicate),
                _ => None,
            },
            Key::Delete | Key::Backspace if !command => Some(CanvasAction::DeleteSelected),
            Key::ArrowUp => Some(CanvasAction::Nudge {
                dx: 0.0,
                dy: -NUDGE_STEP,
            }),
            Key::ArrowDown => Some(CanvasAction::Nudge {
                dx: 0.0,
                dy: NUDGE_STEP,
            }),
            Key::ArrowLeft => Some(CanvasAction::Nudge {
                dx: -NUDGE_STEP,
                dy: 0.0,
            }),
            Key::ArrowRight => Some(CanvasAction::Nudge {
                dx: NUDGE_STEP,
                dy: 0.0,
            }),
            _ => None,
        }
    }

    /// Resolve a key event if the canvas is editable and focused.
    #[must_use]
    pub fn dispatch(event: &KeyEvent, editable: bool, focused: bool) -> Option<CanvasAction> {
        if !(editable && focused) {
            tracing::debug!(
                "Dropped {:?} (editable={editable}, focused={focused})",
                event.key
            );
            return None;
        }
        Self::resolve(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyModifiers;

    #[test]
    fn test_ctrl_chords() {
        let cases = [
            ('t', CanvasAction::AddText),
            ('r', CanvasAction::AddShape(ShapeKind::Rect)),
            ('o', CanvasAction::AddShape(ShapeKind::Circle)),
            ('c', CanvasAction::Copy),
            ('v', CanvasAction::Paste),
            ('d', CanvasAction::Duplicate),
            ('T', CanvasAction::AddText),
        ];
        for (c, action) in cases {
            assert_eq!(
                ShortcutDispatcher::dispatch(&KeyEvent::ctrl(c), true, true),
                Some(action)
            );
        }
    }

    #[test]
    fn test_plain_letters_do_nothing() {
        let event = KeyEvent::plain(Key::Char('c'));
        assert_eq!(ShortcutDispatcher::dispatch(&event, true, true), None);
    }

    #[test]
    fn test_delete_and_arrows() {
        for key in [Key::Delete, Key::Backspace] {
            assert_eq!(
                ShortcutDispatcher::dispatch(&KeyEvent::plain(key), true, true),
                Some(CanvasAction::DeleteSelected)
            );
        }
        assert_eq!(
            ShortcutDispatcher::dispatch(&KeyEvent::plain(Key::ArrowLeft), true, true),
            Some(CanvasAction::Nudge { dx: -1.0, dy: 0.0 })
        );
        assert_eq!(
            ShortcutDispatcher::dispatch(&KeyEvent::plain(Key::ArrowDown), true, true),
            Some(CanvasAction::Nudge { dx: 0.0, dy: 1.0 })
        );
    }

    #[test]
    fn test_meta_works_like_ctrl() {
        let event = KeyEvent {
            key: Key::Char('v'),
            modifiers: KeyModifiers {
                meta: true,
                ..KeyModifiers::default()
            },
        };
        assert_eq!(
            ShortcutDispatcher::dispatch(&event, true, true),
            Some(CanvasAction::Paste)
        );
    }

    #[test]
    fn test_gating_drops_events() {
        let event = KeyEvent::ctrl('t');
        assert_eq!(ShortcutDispatcher::dispatch(&event, false, true), None);
        assert_eq!(ShortcutDispatcher::dispatch(&event, true, false), None);
        assert_eq!(ShortcutDispatcher::dispatch(&event, false, false), None);
    }

    #[test]
    fn test_shortcut_format() {
        let formatted: Vec<_> = ShortcutDispatcher::shortcuts()
            .iter()
            .map(Shortcut::format)
            .collect();
        assert!(formatted.contains(&"Ctrl+T".to_string()));
        assert!(formatted.contains(&"Delete".to_string()));
    }
}
