//! The render pipeline state machine.
//!
//! ```text
//! Initializing ──(surface ready)──► Ready ──(render)──► Rendering
//!                                    ▲                     │
//!                                    └──────(success)──────┤
//!                                                          ▼
//!                     Error(reason) ◄──────(failure)───────┘
//!                          │
//!                  (retry / reset) ──► Rendering
//! ```
//!
//! Rendering never retries on its own. Once in the error state the pipeline
//! ignores plain render requests until the host calls [`RenderPipeline::retry`]
//! or [`RenderPipeline::reset`].

use slide_core::{Element, ElementId, ResolutionProfile};

use crate::draw::{build_document, DocumentOptions};
use crate::error::{RenderError, RenderResult};
use crate::overlay::{overlay_svg, EmptyState};
use crate::surface::Surface;
use crate::RendererConfig;

/// Lifecycle state of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// No usable surface yet.
    Initializing,
    /// Idle with a usable surface.
    Ready,
    /// A frame is being painted.
    Rendering,
    /// The last frame failed; holds the reason.
    Error(String),
}

/// What a frame showed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContent {
    /// The slide's elements.
    Elements,
    /// An empty-slide overlay.
    Empty(EmptyState),
    /// Background only, after a reset.
    Blank,
}

/// Summary of a painted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// What was shown.
    pub content: FrameContent,
    /// Elements painted.
    pub painted: usize,
    /// Elements skipped as unsupported.
    pub skipped: usize,
}

/// Input for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Elements of the slide, in any order.
    pub elements: &'a [Element],
    /// Currently selected element.
    pub selected: Option<ElementId>,
    /// Whether the canvas is editable.
    pub editable: bool,
}

/// Paints frames onto a device-scaled [`Surface`].
pub struct RenderPipeline {
    config: RendererConfig,
    options: usvg::Options<'static>,
    surface: Option<Surface>,
    state: PipelineState,
    last_frame: Option<FrameStats>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("config", &self.config)
            .field("surface", &self.surface.as_ref().map(Surface::backing_size))
            .field("state", &self.state)
            .field("last_frame", &self.last_frame)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    /// Create a pipeline without a surface.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        let options = config.usvg_options();
        Self {
            config,
            options,
            surface: None,
            state: PipelineState::Initializing,
            last_frame: None,
        }
    }

    /// Renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Whether the pipeline has a surface and no pending error.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    /// Reason of the last failure, if the pipeline is in the error state.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PipelineState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Stats of the last painted frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<FrameStats> {
        self.last_frame
    }

    /// The backing surface, once allocated.
    #[must_use]
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Size the backing store for `profile`.
    ///
    /// The first successful call moves the pipeline from `Initializing` to
    /// `Ready`. The caller repaints afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the surface cannot be allocated.
    /// An existing surface and the current state are kept.
    pub fn set_profile(&mut self, profile: &ResolutionProfile) -> RenderResult<()> {
        match self.surface.as_mut() {
            Some(surface) => surface.resize(profile)?,
            None => self.surface = Some(Surface::new(profile)?),
        }
        if self.state == PipelineState::Initializing {
            tracing::debug!("Render pipeline ready");
            self.state = PipelineState::Ready;
        }
        Ok(())
    }

    /// Paint a frame.
    ///
    /// Returns `None` without painting unless the pipeline is `Ready`. A
    /// failure moves the pipeline to the error state and also returns `None`.
    pub fn render(&mut self, frame: &Frame<'_>) -> Option<FrameStats> {
        match &self.state {
            PipelineState::Ready => self.paint(frame),
            PipelineState::Initializing => {
                tracing::debug!("Render skipped: no surface yet");
                None
            }
            PipelineState::Rendering => None,
            PipelineState::Error(reason) => {
                tracing::debug!("Render skipped: pipeline in error state ({reason})");
                None
            }
        }
    }

    /// Leave the error state and paint `frame` again.
    ///
    /// Also paints when the pipeline is `Ready`. Does nothing while
    /// initializing.
    pub fn retry(&mut self, frame: &Frame<'_>) -> Option<FrameStats> {
        match &self.state {
            PipelineState::Error(_) | PipelineState::Ready => {
                tracing::info!("Retrying render");
                self.paint(frame)
            }
            PipelineState::Initializing | PipelineState::Rendering => None,
        }
    }

    /// Repaint a blank background and leave the error state.
    ///
    /// Does nothing while initializing.
    pub fn reset(&mut self) -> Option<FrameStats> {
        let background = self.config.background;
        let surface = self.surface.as_mut()?;
        self.state = PipelineState::Rendering;
        surface.clear(background);
        let stats = FrameStats {
            content: FrameContent::Blank,
            painted: 0,
            skipped: 0,
        };
        self.last_frame = Some(stats);
        self.state = PipelineState::Ready;
        tracing::info!("Render pipeline reset");
        Some(stats)
    }

    fn paint(&mut self, frame: &Frame<'_>) -> Option<FrameStats> {
        self.state = PipelineState::Rendering;
        match self.try_paint(frame) {
            Ok(stats) => {
                self.state = PipelineState::Ready;
                self.last_frame = Some(stats);
                Some(stats)
            }
            Err(e) => {
                tracing::error!("Render failed: {e}");
                self.state = PipelineState::Error(e.to_string());
                None
            }
        }
    }

    fn try_paint(&mut self, frame: &Frame<'_>) -> RenderResult<FrameStats> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| RenderError::Surface("no surface attached".to_string()))?;
        let profile = *surface.profile();

        let empty = frame.elements.is_empty().then(|| EmptyState::for_mode(frame.editable));
        let overlay = empty.map(|state| overlay_svg(state, profile.base_width, profile.base_height));

        let document = build_document(
            frame.elements,
            &DocumentOptions {
                width: profile.base_width,
                height: profile.base_height,
                anti_aliasing: self.config.anti_aliasing,
                selected: frame.selected.filter(|_| frame.editable),
                overlay: overlay.as_deref(),
            },
        )?;
        let tree = usvg::Tree::from_str(&document.svg, &self.options)
            .map_err(|e| RenderError::Document(e.to_string()))?;

        surface.clear(self.config.background);
        surface.draw(&tree);

        tracing::debug!(
            "Painted {} elements ({} skipped) at scale {}",
            document.painted,
            document.skipped,
            profile.scale
        );

        Ok(FrameStats {
            content: empty.map_or(FrameContent::Elements, FrameContent::Empty),
            painted: document.painted,
            skipped: document.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_core::{ElementKind, ShapeProps};

    fn config() -> RendererConfig {
        RendererConfig {
            load_system_fonts: false,
            ..RendererConfig::default()
        }
    }

    fn ready_pipeline() -> RenderPipeline {
        let mut pipeline = RenderPipeline::new(config());
        pipeline
            .set_profile(&ResolutionProfile::from_base(160, 90, 2.0))
            .expect("profile");
        pipeline
    }

    fn frame(elements: &[Element]) -> Frame<'_> {
        Frame {
            elements,
            selected: None,
            editable: true,
        }
    }

    fn bad_element() -> Element {
        Element::new(ElementKind::Shape(ShapeProps {
            fill: "bogus".to_string(),
            ..ShapeProps::default()
        }))
    }

    #[test]
    fn test_initializing_until_profile() {
        let mut pipeline = RenderPipeline::new(config());
        assert_eq!(pipeline.state(), &PipelineState::Initializing);
        assert!(pipeline.render(&frame(&[])).is_none());
        assert!(pipeline.reset().is_none());

        pipeline
            .set_profile(&ResolutionProfile::from_base(16, 9, 1.0))
            .expect("profile");
        assert!(pipeline.is_ready());
    }

    #[test]
    fn test_failed_allocation_stays_initializing() {
        let mut pipeline = RenderPipeline::new(config());
        assert!(pipeline
            .set_profile(&ResolutionProfile::from_base(0, 0, 1.0))
            .is_err());
        assert_eq!(pipeline.state(), &PipelineState::Initializing);
    }

    #[test]
    fn test_empty_frame_content_follows_mode() {
        let mut pipeline = ready_pipeline();
        let stats = pipeline.render(&frame(&[])).expect("stats");
        assert_eq!(stats.content, FrameContent::Empty(EmptyState::Guidance));

        let read_only = Frame {
            editable: false,
            ..frame(&[])
        };
        let stats = pipeline.render(&read_only).expect("stats");
        assert_eq!(stats.content, FrameContent::Empty(EmptyState::Placeholder));
    }

    #[test]
    fn test_error_state_blocks_render_until_retry() {
        let mut pipeline = ready_pipeline();
        let bad = [bad_element()];
        assert!(pipeline.render(&frame(&bad)).is_none());
        assert!(pipeline.error().is_some_and(|e| e.contains("bogus")));

        // No automatic recovery.
        let good = [Element::new(ElementKind::Shape(ShapeProps::default()))];
        assert!(pipeline.render(&frame(&good)).is_none());
        assert!(pipeline.error().is_some());

        let stats = pipeline.retry(&frame(&good)).expect("stats");
        assert_eq!(stats.painted, 1);
        assert!(pipeline.is_ready());
    }

    #[test]
    fn test_retry_with_same_bad_input_fails_again() {
        let mut pipeline = ready_pipeline();
        let bad = [bad_element()];
        pipeline.render(&frame(&bad));
        assert!(pipeline.retry(&frame(&bad)).is_none());
        assert!(pipeline.error().is_some());
    }

    #[test]
    fn test_reset_paints_blank_background() {
        let mut pipeline = ready_pipeline();
        pipeline.render(&frame(&[bad_element()]));

        let stats = pipeline.reset().expect("stats");
        assert_eq!(stats.content, FrameContent::Blank);
        assert!(pipeline.is_ready());

        let surface = pipeline.surface().expect("surface");
        assert_eq!(surface.pixel(0, 0), Some(pipeline.config().background));
    }
}
