//! # Slide Canvas Core
//!
//! Core logic for the slide canvas: the element model, resolution planning,
//! selection, clipboard, layering and keyboard shortcuts. Nothing here draws;
//! see `slide-renderer` for the paint step.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 slide-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Element Model   │  Resolution              │
//! │  - Elements      │  - Display probe         │
//! │  - Slides        │  - Capability tiers      │
//! │  - Store         │  - Backing-store sizing  │
//! ├─────────────────────────────────────────────┤
//! │  Manipulation    │  Input                   │
//! │  - Selection     │  - Key / pointer events  │
//! │  - Clipboard     │  - Shortcut dispatch     │
//! │  - Layering      │  - Guidance flags        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All element coordinates are base (unscaled) slide units. Only the paint
//! step applies the device scale.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod display;
pub mod element;
pub mod error;
pub mod event;
pub mod guidance;
pub mod layering;
pub mod resolution;
pub mod selection;
pub mod shortcut;
pub mod slide;
pub mod store;

pub use display::{CapabilityTier, DisplayCapabilities, DisplaySignals};
pub use element::{
    Element, ElementId, ElementKind, ElementPatch, FontStyle, FontWeight, ImageProps, ShapeKind,
    ShapeProps, TextAlign, TextProps, Transform,
};
pub use error::{SlideError, SlideResult};
pub use event::{InputEvent, Key, KeyEvent, KeyModifiers, PointerPhase};
pub use guidance::{FileGuidanceStore, GuidanceStore, MemoryGuidanceStore, DEFAULT_GUIDANCE_KEY};
pub use resolution::{
    PlannerConfig, QualityMode, ResolutionPlanner, ResolutionProfile, SLIDE_ASPECT_RATIO,
};
pub use selection::{Clipboard, ClipboardEntry, Selection, PASTE_OFFSET};
pub use shortcut::{CanvasAction, Shortcut, ShortcutDispatcher, NUDGE_STEP};
pub use slide::{paint_order, Slide, SlideId};
pub use store::{ChangeListener, MemorySlideStore, SlideChange, SlideStore, StoreError, SubscriptionId};

/// Slide core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
