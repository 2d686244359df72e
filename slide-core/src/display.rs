//! Display capability probing.
//!
//! Classifies the runtime display into a coarse capability tier that caps
//! the device scale used for the backing store.

use serde::{Deserialize, Serialize};

/// Physical width at or above which a display counts as 4K-capable.
pub const FOUR_K_WIDTH: u32 = 3840;

/// Physical width at or above which a display counts as 8K-capable.
pub const EIGHT_K_WIDTH: u32 = 7680;

/// Pixel ratio at or above which a display counts as ultra-high-DPI.
pub const ULTRA_HIGH_DPI_RATIO: f64 = 3.0;

/// Coarse classification of display density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    /// Ordinary display.
    Standard,
    /// Pixel ratio of 3 or more.
    HighDpi,
    /// 4K-class physical resolution.
    FourK,
    /// 8K-class physical resolution.
    EightK,
}

impl CapabilityTier {
    /// Largest device scale allowed for this tier.
    #[must_use]
    pub fn max_scale(self) -> f64 {
        match self {
            Self::Standard => 2.0,
            Self::HighDpi => 3.0,
            Self::FourK => 4.0,
            Self::EightK => 6.0,
        }
    }
}

/// Raw signals read from the host environment.
///
/// Every field is optional; missing or unusable values fall back to a
/// standard display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySignals {
    /// Device pixel ratio reported by the host.
    pub device_pixel_ratio: Option<f64>,
    /// Screen width in CSS pixels.
    pub screen_width: Option<u32>,
    /// Screen height in CSS pixels.
    pub screen_height: Option<u32>,
}

/// Result of probing the display once per mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisplayCapabilities {
    /// Sanitized device pixel ratio (always finite and positive).
    pub pixel_ratio: f64,
    /// Pixel ratio of 3 or more.
    pub is_ultra_high_dpi: bool,
    /// Physical width of at least 3840 pixels.
    pub is_4k_capable: bool,
    /// Physical width of at least 7680 pixels.
    pub is_8k_capable: bool,
    /// Physical screen width in device pixels (0 when unknown).
    pub physical_width: u32,
    /// Physical screen height in device pixels (0 when unknown).
    pub physical_height: u32,
}

impl Default for DisplayCapabilities {
    fn default() -> Self {
        Self::standard()
    }
}

impl DisplayCapabilities {
    /// A plain 1x display with no known screen size.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            pixel_ratio: 1.0,
            is_ultra_high_dpi: false,
            is_4k_capable: false,
            is_8k_capable: false,
            physical_width: 0,
            physical_height: 0,
        }
    }

    /// Classify the environment described by `signals`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn probe(signals: &DisplaySignals) -> Self {
        let pixel_ratio = signals
            .device_pixel_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0);

        let physical = |css: Option<u32>| {
            css.map_or(0, |v| (f64::from(v) * pixel_ratio).round() as u32)
        };
        let physical_width = physical(signals.screen_width);
        let physical_height = physical(signals.screen_height);

        let caps = Self {
            pixel_ratio,
            is_ultra_high_dpi: pixel_ratio >= ULTRA_HIGH_DPI_RATIO,
            is_4k_capable: physical_width >= FOUR_K_WIDTH,
            is_8k_capable: physical_width >= EIGHT_K_WIDTH,
            physical_width,
            physical_height,
        };

        tracing::debug!(
            "Display probe: ratio={} physical={}x{} tier={:?}",
            caps.pixel_ratio,
            caps.physical_width,
            caps.physical_height,
            caps.tier()
        );
        caps
    }

    /// Capabilities for an explicit tier, used when the host already knows
    /// what it is running on.
    #[must_use]
    pub fn for_tier(tier: CapabilityTier, pixel_ratio: f64) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let (physical_width, physical_height) = match tier {
            CapabilityTier::EightK => (EIGHT_K_WIDTH, 4320),
            CapabilityTier::FourK => (FOUR_K_WIDTH, 2160),
            CapabilityTier::HighDpi | CapabilityTier::Standard => (0, 0),
        };
        Self {
            pixel_ratio,
            // A standard tier stays standard whatever ratio it reports.
            is_ultra_high_dpi: tier == CapabilityTier::HighDpi
                || (tier > CapabilityTier::HighDpi && pixel_ratio >= ULTRA_HIGH_DPI_RATIO),
            is_4k_capable: tier >= CapabilityTier::FourK,
            is_8k_capable: tier == CapabilityTier::EightK,
            physical_width,
            physical_height,
        }
    }

    /// The highest tier these capabilities qualify for.
    #[must_use]
    pub fn tier(&self) -> CapabilityTier {
        if self.is_8k_capable {
            CapabilityTier::EightK
        } else if self.is_4k_capable {
            CapabilityTier::FourK
        } else if self.is_ultra_high_dpi {
            CapabilityTier::HighDpi
        } else {
            CapabilityTier::Standard
        }
    }

    /// Device scale ceiling for the backing store.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        self.tier().max_scale()
    }
}
