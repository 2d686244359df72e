//! # Slide Canvas Renderer
//!
//! Paints slide elements onto a device-scaled backing store.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Elements (base units, any order)           │
//! ├─────────────────────────────────────────────┤
//! │  draw: z-ordered drawing document           │
//! │        + selection outline / empty overlay  │
//! ├─────────────────────────────────────────────┤
//! │  usvg parse  ──►  resvg raster × scale      │
//! ├─────────────────────────────────────────────┤
//! │  Surface (tiny-skia pixmap, scaled size)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Element coordinates never carry the device scale; it is applied once,
//! as a transform, when the document is rasterized.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod draw;
pub mod error;
#[cfg(feature = "export")]
pub mod export;
pub mod overlay;
pub mod pipeline;
pub mod surface;

pub use draw::{build_document, parse_color, DocumentOptions, DrawDocument, Rgba};
pub use error::{RenderError, RenderResult};
#[cfg(feature = "export")]
pub use export::{ExportConfig, ExportFormat, SlideExporter};
pub use overlay::{EmptyState, EMPTY_TITLE};
pub use pipeline::{Frame, FrameContent, FrameStats, PipelineState, RenderPipeline};
pub use surface::Surface;

/// Configuration for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Background color (straight RGBA).
    pub background: [u8; 4],
    /// Enable anti-aliasing of geometry.
    pub anti_aliasing: bool,
    /// Load system fonts for text. Without fonts, text is not drawn.
    pub load_system_fonts: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255], // White
            anti_aliasing: true,
            load_system_fonts: true,
        }
    }
}

impl RendererConfig {
    /// Parser options with high-quality rendering hints.
    pub(crate) fn usvg_options(&self) -> usvg::Options<'static> {
        let mut options = usvg::Options {
            shape_rendering: if self.anti_aliasing {
                usvg::ShapeRendering::GeometricPrecision
            } else {
                usvg::ShapeRendering::CrispEdges
            },
            text_rendering: usvg::TextRendering::GeometricPrecision,
            image_rendering: usvg::ImageRendering::OptimizeQuality,
            ..usvg::Options::default()
        };
        if self.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
            tracing::debug!("Loaded {} font faces", options.fontdb.len());
        }
        options
    }
}

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
