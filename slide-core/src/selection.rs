//! Single selection and single-slot clipboard.

use serde::{Deserialize, Serialize};

use crate::{Element, ElementId, ElementKind, Transform};

/// Offset applied to pasted elements, in base pixels.
///
/// Measured from the copied element's position, so a paste never overlaps
/// the original exactly. Repeated pastes of one entry land on the same spot.
pub const PASTE_OFFSET: (f32, f32) = (20.0, 20.0);

/// At most one selected element.
///
/// The selection is a non-owning reference by ID: it never keeps an element
/// alive, and [`Selection::retain_existing`] clears it once the element is
/// gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ElementId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. `None` clears it.
    pub fn select(&mut self, id: Option<ElementId>) {
        if self.selected != id {
            tracing::debug!("Selection {:?} -> {:?}", self.selected, id);
        }
        self.selected = id;
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.select(None);
    }

    /// The selected element ID, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Whether `id` is the selected element.
    #[must_use]
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    /// Clear the selection if the selected element is not in `elements`.
    ///
    /// Returns `true` if the selection was cleared.
    pub fn retain_existing(&mut self, elements: &[Element]) -> bool {
        match self.selected {
            Some(id) if !elements.iter().any(|e| e.id == id) => {
                self.clear();
                true
            }
            _ => false,
        }
    }
}

/// A copied element: its content and size plus where it was copied from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Copied content.
    pub kind: ElementKind,
    /// Copied width.
    pub width: f32,
    /// Copied height.
    pub height: f32,
    /// Rotation of the original.
    pub angle: f32,
    /// Position of the original, used to place pasted copies.
    pub origin: (f32, f32),
}

/// Single-slot clipboard, independent of the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    entry: Option<ClipboardEntry>,
}

impl Clipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy an element, replacing any previous entry.
    pub fn copy(&mut self, element: &Element) {
        let t = &element.transform;
        self.entry = Some(ClipboardEntry {
            kind: element.kind.clone(),
            width: t.width,
            height: t.height,
            angle: t.angle,
            origin: (t.x, t.y),
        });
        tracing::debug!("Copied {} element {}", element.kind.type_name(), element.id);
    }

    /// Whether the clipboard holds an entry.
    #[must_use]
    pub fn has_entry(&self) -> bool {
        self.entry.is_some()
    }

    /// The current entry, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    /// Build a new element from the clipboard.
    ///
    /// The copy gets a fresh ID, sits at [`PASTE_OFFSET`] from the original
    /// and uses `z_index` for stacking. Returns `None` if the clipboard is
    /// empty. The entry stays in place so pasting can be repeated.
    #[must_use]
    pub fn paste(&self, z_index: i64) -> Option<Element> {
        let entry = self.entry.as_ref()?;
        let (x, y) = entry.origin;
        Some(Element::new(entry.kind.clone()).with_transform(Transform {
            x: x + PASTE_OFFSET.0,
            y: y + PASTE_OFFSET.1,
            width: entry.width,
            height: entry.height,
            angle: entry.angle,
            z_index,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShapeKind, ShapeProps, TextProps};

    fn circle_at(x: f32, y: f32) -> Element {
        Element::new(ElementKind::Shape(ShapeProps {
            shape: ShapeKind::Circle,
            ..ShapeProps::default()
        }))
        .with_position(x, y)
        .with_size(40.0, 30.0)
    }

    #[test]
    fn test_select_replaces_previous() {
        let a = ElementId::new();
        let b = ElementId::new();
        let mut selection = Selection::new();

        selection.select(Some(a));
        selection.select(Some(b));
        assert_eq!(selection.selected(), Some(b));
        assert!(!selection.is_selected(a));

        selection.clear();
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_retain_existing_clears_dangling() {
        let element = circle_at(0.0, 0.0);
        let mut selection = Selection::new();
        selection.select(Some(element.id));

        assert!(!selection.retain_existing(std::slice::from_ref(&element)));
        assert!(selection.retain_existing(&[]));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_empty_clipboard_pastes_nothing() {
        let clipboard = Clipboard::new();
        assert!(!clipboard.has_entry());
        assert!(clipboard.paste(1).is_none());
    }

    #[test]
    fn test_paste_offsets_from_original() {
        let original = circle_at(100.0, 50.0);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&original);

        let first = clipboard.paste(7).expect("paste");
        let second = clipboard.paste(8).expect("paste");

        for pasted in [&first, &second] {
            assert_ne!(pasted.id, original.id);
            assert_eq!(pasted.kind, original.kind);
            assert_eq!(pasted.transform.x, 100.0 + PASTE_OFFSET.0);
            assert_eq!(pasted.transform.y, 50.0 + PASTE_OFFSET.1);
            assert_eq!(pasted.transform.width, 40.0);
            assert_eq!(pasted.transform.height, 30.0);
        }
        assert_ne!(first.id, second.id);
        assert_eq!(first.transform.z_index, 7);
    }

    #[test]
    fn test_paste_keeps_rotation() {
        let mut clipboard = Clipboard::new();
        let mut original = circle_at(10.0, 10.0);
        original.transform.angle = 45.0;
        clipboard.copy(&original);

        let pasted = clipboard.paste(1).expect("paste");
        assert_eq!(pasted.transform.angle, 45.0);
    }

    #[test]
    fn test_copy_overwrites_entry() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&circle_at(0.0, 0.0));
        let text = Element::new(ElementKind::Text(TextProps::default()));
        clipboard.copy(&text);

        let entry = clipboard.entry().expect("entry");
        assert_eq!(entry.kind, text.kind);
    }
}
