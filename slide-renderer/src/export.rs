//! Slide thumbnail export.
//!
//! Renders a slide's elements off-screen to PNG, JPEG or SVG, without
//! selection outlines or empty-state overlays.

use base64::Engine;
use image::ImageEncoder;
use slide_core::{Element, ResolutionProfile};

use crate::draw::{build_document, DocumentOptions};
use crate::error::{RenderError, RenderResult};
use crate::surface::Surface;
use crate::RendererConfig;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG document in base units.
    Svg,
}

impl ExportFormat {
    /// MIME type of the format.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// Configuration for export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output width in pixels; height follows the slide's aspect ratio.
    /// Defaults to the base width.
    pub width: Option<u32>,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
    /// Background, anti-aliasing and font settings.
    pub renderer: RendererConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            jpeg_quality: 85,
            renderer: RendererConfig::default(),
        }
    }
}

/// Exports slide elements to image formats.
pub struct SlideExporter {
    config: ExportConfig,
    options: usvg::Options<'static>,
}

impl std::fmt::Debug for SlideExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideExporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlideExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let options = config.renderer.usvg_options();
        Self { config, options }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export elements of a `base_width` x `base_height` slide.
    ///
    /// # Errors
    ///
    /// Returns an error if the elements cannot be rendered or encoded.
    pub fn export(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
        format: ExportFormat,
    ) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(elements, base_width, base_height),
            ExportFormat::Jpeg => self.render_to_jpeg(elements, base_width, base_height),
            ExportFormat::Svg => Ok(self
                .render_to_svg(elements, base_width, base_height)?
                .into_bytes()),
        }
    }

    /// Export to an SVG string in base units.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is malformed.
    pub fn render_to_svg(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
    ) -> RenderResult<String> {
        let document = build_document(
            elements,
            &DocumentOptions {
                width: base_width,
                height: base_height,
                anti_aliasing: self.config.renderer.anti_aliasing,
                selected: None,
                overlay: None,
            },
        )?;
        Ok(document.svg)
    }

    /// Export to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
    ) -> RenderResult<Vec<u8>> {
        self.rasterize(elements, base_width, base_height)?
            .encode_png()
    }

    /// Export to JPEG bytes, flattened onto the background.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
    ) -> RenderResult<Vec<u8>> {
        let surface = self.rasterize(elements, base_width, base_height)?;
        let (width, height) = surface.backing_size();
        let bg = &self.config.renderer.background;

        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in surface.pixmap().data().chunks_exact(4) {
            // Premultiplied: composite as `src + bg * (1 - a)`.
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&src, &back) in pixel[..3].iter().zip(bg.iter()) {
                let value = f32::from(back).mul_add(inv, f32::from(src));
                rgb_data.push(value.round().min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// PNG thumbnail as a `data:` URI, suitable for a slide's thumbnail field.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn thumbnail_data_uri(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
    ) -> RenderResult<String> {
        let png = self.render_to_png(elements, base_width, base_height)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("data:{};base64,{encoded}", ExportFormat::Png.mime_type()))
    }

    fn rasterize(
        &self,
        elements: &[Element],
        base_width: u32,
        base_height: u32,
    ) -> RenderResult<Surface> {
        if base_width == 0 || base_height == 0 {
            return Err(RenderError::Export(format!(
                "cannot export a {base_width}x{base_height} slide"
            )));
        }
        let width = self.config.width.unwrap_or(base_width).max(1);
        let scale = f64::from(width) / f64::from(base_width);
        let profile = ResolutionProfile::from_base(base_width, base_height, scale);

        let svg = self.render_to_svg(elements, base_width, base_height)?;
        let tree = usvg::Tree::from_str(&svg, &self.options)
            .map_err(|e| RenderError::Document(e.to_string()))?;

        let mut surface = Surface::new(&profile)?;
        surface.clear(self.config.renderer.background);
        surface.draw(&tree);
        tracing::debug!(
            "Exported {} elements at {}x{}",
            elements.len(),
            profile.scaled_width,
            profile.scaled_height
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_core::{ElementKind, ShapeProps, TextProps};

    fn exporter(width: Option<u32>) -> SlideExporter {
        SlideExporter::new(ExportConfig {
            width,
            renderer: RendererConfig {
                load_system_fonts: false,
                ..RendererConfig::default()
            },
            ..ExportConfig::default()
        })
    }

    fn elements() -> Vec<Element> {
        vec![
            Element::new(ElementKind::Shape(ShapeProps::default())).with_position(10.0, 10.0),
            Element::new(ElementKind::Text(TextProps::default())).with_position(50.0, 50.0),
        ]
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let png = exporter(None).render_to_png(&elements(), 320, 180).expect("png");
        assert_eq!(&png[..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let jpeg = exporter(Some(160))
            .export(&elements(), 320, 180, ExportFormat::Jpeg)
            .expect("jpeg");
        assert!(jpeg.len() > 2);
        assert_eq!(jpeg[0], 0xFF);
        assert_eq!(jpeg[1], 0xD8);
    }

    #[test]
    fn test_svg_export_has_no_overlay() {
        let svg = exporter(None).render_to_svg(&[], 320, 180).expect("svg");
        assert!(!svg.contains("This slide is empty"));
    }

    #[test]
    fn test_thumbnail_width_sets_scale() {
        let surface = exporter(Some(160)).rasterize(&elements(), 320, 180).expect("surface");
        assert_eq!(surface.backing_size(), (160, 90));
    }

    #[test]
    fn test_data_uri() {
        let uri = exporter(Some(64))
            .thumbnail_data_uri(&elements(), 320, 180)
            .expect("uri");
        assert!(uri.starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn test_zero_size_slide_fails() {
        assert!(exporter(None).render_to_png(&[], 0, 180).is_err());
    }
}
