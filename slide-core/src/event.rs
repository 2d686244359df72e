//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only Control held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Whether the platform command modifier (Control, or Command on macOS
    /// keyboards) is held.
    #[must_use]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key on the keyboard, as far as the canvas cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "key", content = "char")]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Delete (forward delete).
    Delete,
    /// Backspace.
    Backspace,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Escape.
    Escape,
}

impl Key {
    /// Parse a DOM-style key name (`"t"`, `"Delete"`, `"ArrowUp"`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Delete" => Some(Self::Delete),
            "Backspace" => Some(Self::Backspace),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "Escape" => Some(Self::Escape),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Self::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// A key press delivered to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Active modifier keys.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// A key pressed without modifiers.
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    /// A character pressed together with Control.
    #[must_use]
    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: KeyModifiers::CTRL,
        }
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved with the button held.
    Move,
    /// Button released.
    Up,
}

/// All input events the canvas can receive.
///
/// Pointer coordinates are in display (CSS) pixels relative to the canvas,
/// which coincide with base slide coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse, pen or touch) event.
    Pointer {
        /// Interaction phase.
        phase: PointerPhase,
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Keyboard event.
    Key(KeyEvent),

    /// The canvas region gained or lost logical focus.
    Focus(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("t"), Some(Key::Char('t')));
        assert_eq!(Key::from_name("Backspace"), Some(Key::Backspace));
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_name("PageDown"), None);
        assert_eq!(Key::from_name(""), None);
    }

    #[test]
    fn test_meta_counts_as_command() {
        let mods = KeyModifiers {
            meta: true,
            ..KeyModifiers::default()
        };
        assert!(mods.command());
        assert!(!KeyModifiers::default().command());
    }

    #[test]
    fn test_event_json() {
        let event = InputEvent::Key(KeyEvent::ctrl('c'));
        let json = serde_json::to_string(&event).expect("serialize");
        let back: InputEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
