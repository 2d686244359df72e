//! Device-scaled backing store.

use slide_core::ResolutionProfile;
use tiny_skia::{Color, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Pixel surface sized to the scaled resolution of a profile.
///
/// Drawing happens in base units; the surface applies the profile scale
/// when rasterizing.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
    profile: ResolutionProfile,
}

impl Surface {
    /// Allocate a surface for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the scaled size is zero or too large.
    pub fn new(profile: &ResolutionProfile) -> RenderResult<Self> {
        let pixmap = allocate(profile)?;
        tracing::debug!(
            "Allocated {}x{} surface for {}x{} display (scale {})",
            profile.scaled_width,
            profile.scaled_height,
            profile.display_width,
            profile.display_height,
            profile.scale
        );
        Ok(Self {
            pixmap,
            profile: *profile,
        })
    }

    /// Adopt a new profile, reallocating only when the backing size changes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if reallocation fails; the old
    /// surface is kept in that case.
    pub fn resize(&mut self, profile: &ResolutionProfile) -> RenderResult<()> {
        if self.pixmap.width() != profile.scaled_width
            || self.pixmap.height() != profile.scaled_height
        {
            self.pixmap = allocate(profile)?;
            tracing::debug!(
                "Resized surface to {}x{}",
                profile.scaled_width,
                profile.scaled_height
            );
        }
        self.profile = *profile;
        Ok(())
    }

    /// The profile this surface was sized for.
    #[must_use]
    pub fn profile(&self) -> &ResolutionProfile {
        &self.profile
    }

    /// Backing store size in pixels.
    #[must_use]
    pub fn backing_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Logical display size, equal to the base size.
    #[must_use]
    pub fn display_size(&self) -> (u32, u32) {
        (self.profile.display_width, self.profile.display_height)
    }

    /// Device scale applied while drawing.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.profile.scale
    }

    /// Fill the whole surface with `background` (straight RGBA).
    pub fn clear(&mut self, background: [u8; 4]) {
        let [r, g, b, a] = background;
        self.pixmap.fill(Color::from_rgba8(r, g, b, a));
    }

    /// Rasterize a parsed document, scaling base units to backing pixels.
    pub fn draw(&mut self, tree: &usvg::Tree) {
        #[allow(clippy::cast_possible_truncation)]
        let scale = self.profile.scale as f32;
        resvg::render(
            tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut self.pixmap.as_mut(),
        );
    }

    /// Straight RGBA of the backing pixel at (`x`, `y`).
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode the backing store as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Export`] if encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(e.to_string()))
    }
}

fn allocate(profile: &ResolutionProfile) -> RenderResult<Pixmap> {
    Pixmap::new(profile.scaled_width, profile.scaled_height).ok_or_else(|| {
        RenderError::Surface(format!(
            "cannot allocate {}x{} backing store",
            profile.scaled_width, profile.scaled_height
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_and_display_sizes() {
        let profile = ResolutionProfile::from_base(320, 180, 2.0);
        let surface = Surface::new(&profile).expect("surface");
        assert_eq!(surface.backing_size(), (640, 360));
        assert_eq!(surface.display_size(), (320, 180));
    }

    #[test]
    fn test_resize_keeps_allocation_when_unchanged() {
        let profile = ResolutionProfile::from_base(100, 50, 1.0);
        let mut surface = Surface::new(&profile).expect("surface");
        surface.clear([255, 0, 0, 255]);
        surface.resize(&profile).expect("resize");
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));

        surface
            .resize(&ResolutionProfile::from_base(100, 50, 3.0))
            .expect("resize");
        assert_eq!(surface.backing_size(), (300, 150));
    }

    #[test]
    fn test_zero_size_fails() {
        let profile = ResolutionProfile::from_base(0, 0, 1.0);
        assert!(matches!(Surface::new(&profile), Err(RenderError::Surface(_))));
    }

    #[test]
    fn test_png_magic() {
        let surface = Surface::new(&ResolutionProfile::from_base(4, 4, 1.0)).expect("surface");
        let png = surface.encode_png().expect("png");
        assert_eq!(&png[..4], &[137, 80, 78, 71]);
    }
}
