//! Resolution planning.
//!
//! Fits a slide of the preferred aspect ratio into a container and derives
//! the backing-store resolution from the display capabilities.
//!
//! ```text
//!   container (CSS px)          base (CSS px)         backing store (device px)
//! ┌──────────────────────┐    ┌──────────────┐      ┌────────────────────────┐
//! │   ┌──────────────┐   │ →  │              │  ×s  │                        │
//! │   │  16:9 slide  │   │    │  1280 x 720  │  →   │      3840 x 2160       │
//! │   └──────────────┘   │    └──────────────┘      └────────────────────────┘
//! └──────────────────────┘      display size           s = min(dpr, ceiling)
//! ```

use serde::{Deserialize, Serialize};

use crate::{DisplayCapabilities, SlideError, SlideResult};

/// The standard slide aspect ratio.
pub const SLIDE_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Device scale ceiling applied in [`QualityMode::Performance`].
pub const PERFORMANCE_MAX_SCALE: f64 = 2.0;

/// Rendering quality trade-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// Use the full device scale allowed by the capability tier.
    #[default]
    Standard,
    /// Cap the device scale to keep the backing store small.
    Performance,
}

/// Configuration for the [`ResolutionPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Preferred width / height ratio of the slide.
    pub aspect_ratio: f64,
    /// Quality trade-off.
    pub quality: QualityMode,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: SLIDE_ASPECT_RATIO,
            quality: QualityMode::Standard,
        }
    }
}

/// Computed resolution for one slide canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionProfile {
    /// Logical slide width.
    pub base_width: u32,
    /// Logical slide height.
    pub base_height: u32,
    /// Device scale applied at paint time.
    pub scale: f64,
    /// Backing-store width (`base_width × scale`).
    pub scaled_width: u32,
    /// Backing-store height (`base_height × scale`).
    pub scaled_height: u32,
    /// CSS display width (always `base_width`).
    pub display_width: u32,
    /// CSS display height (always `base_height`).
    pub display_height: u32,
}

impl ResolutionProfile {
    /// Profile for an exact base size and scale.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_base(base_width: u32, base_height: u32, scale: f64) -> Self {
        let scaled = |v: u32| (f64::from(v) * scale).round() as u32;
        Self {
            base_width,
            base_height,
            scale,
            scaled_width: scaled(base_width),
            scaled_height: scaled(base_height),
            display_width: base_width,
            display_height: base_height,
        }
    }
}

/// Computes [`ResolutionProfile`]s.
///
/// Planning is a pure function of its inputs: nothing is cached and repeated
/// calls with the same inputs return identical profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolutionPlanner {
    config: PlannerConfig,
}

impl ResolutionPlanner {
    /// Create a planner with the given configuration.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Get the planner configuration.
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Device scale for the given capabilities, in `[1, ceiling]`.
    #[must_use]
    pub fn device_scale(&self, caps: &DisplayCapabilities) -> f64 {
        let mut ceiling = caps.max_scale();
        if self.config.quality == QualityMode::Performance {
            ceiling = ceiling.min(PERFORMANCE_MAX_SCALE);
        }
        caps.pixel_ratio.min(ceiling).max(1.0)
    }

    /// Plan the resolution for a container.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::InvalidContainer`] if the container is smaller
    /// than one pixel in either dimension or not finite, or if the configured
    /// aspect ratio is unusable.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn plan(
        &self,
        container_width: f64,
        container_height: f64,
        caps: &DisplayCapabilities,
    ) -> SlideResult<ResolutionProfile> {
        let invalid = || SlideError::InvalidContainer {
            width: container_width,
            height: container_height,
        };

        let ratio = self.config.aspect_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(invalid());
        }

        let cw = container_width.floor();
        let ch = container_height.floor();
        if !(cw.is_finite() && ch.is_finite()) || cw < 1.0 || ch < 1.0 {
            return Err(invalid());
        }

        // Letterbox: the tighter dimension limits the slide.
        let (w, h) = if cw / ch > ratio {
            ((ch * ratio).round().min(cw), ch)
        } else {
            (cw, (cw / ratio).round().min(ch))
        };

        let profile =
            ResolutionProfile::from_base(w.max(1.0) as u32, h.max(1.0) as u32, self.device_scale(caps));

        tracing::debug!(
            "Planned {}x{} container -> base {}x{} scale {} backing {}x{}",
            container_width,
            container_height,
            profile.base_width,
            profile.base_height,
            profile.scale,
            profile.scaled_width,
            profile.scaled_height
        );
        Ok(profile)
    }
}
