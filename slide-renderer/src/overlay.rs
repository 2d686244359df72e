//! Empty-slide overlays.
//!
//! An editable canvas with no elements shows guidance with affordances for
//! adding content; a read-only one shows a plain placeholder.

use std::fmt::Write;

use crate::draw::escape_xml;

/// Title shown on an empty slide.
pub const EMPTY_TITLE: &str = "This slide is empty";

/// What an empty slide displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Editable: guidance with add-content affordances.
    Guidance,
    /// Read-only: a placeholder message.
    Placeholder,
}

impl EmptyState {
    /// Pick the empty state for an editable or read-only canvas.
    #[must_use]
    pub fn for_mode(editable: bool) -> Self {
        if editable {
            Self::Guidance
        } else {
            Self::Placeholder
        }
    }
}

/// An add-content affordance shown in the guidance overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    /// Button label.
    pub label: &'static str,
    /// Shortcut hint, if any.
    pub hint: Option<&'static str>,
}

/// Affordances offered on an empty editable slide, left to right.
pub const AFFORDANCES: [Affordance; 3] = [
    Affordance {
        label: "Add text",
        hint: Some("Ctrl+T"),
    },
    Affordance {
        label: "Add shape",
        hint: Some("Ctrl+R"),
    },
    Affordance {
        label: "Add image",
        hint: None,
    },
];

/// Build the overlay markup for a `width` x `height` slide in base units.
#[must_use]
pub fn overlay_svg(state: EmptyState, width: u32, height: u32) -> String {
    let w = f64::from(width);
    let h = f64::from(height);
    let cx = w / 2.0;
    let mut svg = String::new();

    match state {
        EmptyState::Placeholder => {
            let _ = write!(
                svg,
                "<text x=\"{cx}\" y=\"{}\" font-size=\"{}\" fill=\"#9ca3af\" text-anchor=\"middle\" font-family=\"sans-serif\">{EMPTY_TITLE}</text>",
                h / 2.0,
                (h / 18.0).max(12.0),
            );
        }
        EmptyState::Guidance => {
            let title_size = (h / 16.0).max(14.0);
            let _ = write!(
                svg,
                "<text x=\"{cx}\" y=\"{}\" font-size=\"{title_size}\" fill=\"#374151\" text-anchor=\"middle\" font-family=\"sans-serif\" font-weight=\"bold\">{EMPTY_TITLE}</text>",
                h * 0.35,
            );

            let gap = w * 0.02;
            let card_w = w * 0.18;
            let card_h = h * 0.14;
            #[allow(clippy::cast_precision_loss)]
            let count = AFFORDANCES.len() as f64;
            let row_w = card_w * count + gap * (count - 1.0);
            let top = h * 0.45;
            let label_size = (card_h / 4.0).max(10.0);

            for (i, affordance) in AFFORDANCES.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let left = cx - row_w / 2.0 + (card_w + gap) * i as f64;
                let _ = write!(
                    svg,
                    "<rect x=\"{left}\" y=\"{top}\" width=\"{card_w}\" height=\"{card_h}\" rx=\"8\" fill=\"#f9fafb\" stroke=\"#9ca3af\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\" stroke-linejoin=\"round\"/>",
                );
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"{label_size}\" fill=\"#1f2937\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                    left + card_w / 2.0,
                    top + card_h * 0.45,
                    escape_xml(affordance.label),
                );
                if let Some(hint) = affordance.hint {
                    let _ = write!(
                        svg,
                        "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"#6b7280\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
                        left + card_w / 2.0,
                        top + card_h * 0.75,
                        label_size * 0.8,
                        escape_xml(hint),
                    );
                }
            }
        }
    }

    svg
}
