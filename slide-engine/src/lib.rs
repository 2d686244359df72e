//! # Slide Canvas Engine
//!
//! One parametrized canvas that wires an injected slide store to resolution
//! planning, rendering, selection, clipboard, layering and shortcuts.
//!
//! ## Data flow
//!
//! ```text
//! container resize / capability change
//!        │
//!        ▼
//! ResolutionPlanner ──► RenderPipeline ──► Surface
//!        ▲                    ▲
//!        │               dirty flag
//!        │                    │
//! pointer / keys ──► actions ──► SlideStore ──(change notification)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use slide_core::{DisplayCapabilities, MemorySlideStore, ShapeKind};
//! use slide_engine::{EngineConfig, SlideCanvas};
//!
//! let store = Arc::new(MemorySlideStore::new());
//! let mut canvas = SlideCanvas::new(store, 1, EngineConfig::default(), DisplayCapabilities::standard());
//! canvas.resize(1280.0, 720.0);
//!
//! canvas.add_shape(ShapeKind::Rect);
//! assert!(!canvas.is_empty());
//! assert!(canvas.repaint_if_dirty().is_some());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod config;
pub mod defaults;

pub use canvas::SlideCanvas;
pub use config::EngineConfig;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
