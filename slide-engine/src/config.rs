//! Engine configuration.

use serde::{Deserialize, Serialize};
use slide_core::{PlannerConfig, DEFAULT_GUIDANCE_KEY};
use slide_renderer::RendererConfig;

/// Configuration for a [`SlideCanvas`](crate::SlideCanvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the canvas accepts edits and shortcuts.
    pub editable: bool,
    /// Resolution planning: aspect ratio and quality mode.
    pub planner: PlannerConfig,
    /// Paint settings.
    #[serde(skip)]
    pub renderer: RendererConfig,
    /// Key of the first-use guidance flag.
    pub guidance_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            editable: true,
            planner: PlannerConfig::default(),
            renderer: RendererConfig::default(),
            guidance_key: DEFAULT_GUIDANCE_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    /// A read-only configuration.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            editable: false,
            ..Self::default()
        }
    }
}
