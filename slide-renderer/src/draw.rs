//! Conversion of slide elements into drawing documents.
//!
//! Elements are written into an SVG document expressed in base (unscaled)
//! slide units. The device scale is applied later, when the document is
//! rasterized onto the backing store.

use std::fmt::Write;

use slide_core::{
    paint_order, Element, ElementId, ElementKind, FontStyle, FontWeight, ImageProps, ShapeKind,
    ShapeProps, TextAlign, TextProps,
};

use crate::error::{RenderError, RenderResult};

/// Outline color of the selected element.
pub const SELECTION_COLOR: &str = "#2563eb";

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// A parsed color, straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// `#rrggbb` form, ignoring alpha.
    #[must_use]
    pub fn hex(&self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Alpha as a `0..=1` opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        f32::from(self.0[3]) / 255.0
    }
}

/// Parse a color string.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `transparent`/`none` and a handful
/// of common color names.
#[must_use]
pub fn parse_color(value: &str) -> Option<Rgba> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut out = [0, 0, 0, 255];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let nibble = u8::try_from(c.to_digit(16)?).ok()?;
                    *slot = nibble * 17;
                }
                Some(Rgba(out))
            }
            6 => Some(Rgba([byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255])),
            8 => Some(Rgba([
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            ])),
            _ => None,
        };
    }

    let rgb = match value.to_ascii_lowercase().as_str() {
        "transparent" | "none" => return Some(Rgba([0, 0, 0, 0])),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Output of converting an element list.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawDocument {
    /// SVG source in base units.
    pub svg: String,
    /// Number of elements written.
    pub painted: usize,
    /// Number of elements skipped because their type is unknown.
    pub skipped: usize,
}

/// Options for [`build_document`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentOptions<'a> {
    /// Base width.
    pub width: u32,
    /// Base height.
    pub height: u32,
    /// Whether geometry is anti-aliased.
    pub anti_aliasing: bool,
    /// Element to outline as selected.
    pub selected: Option<ElementId>,
    /// Extra markup drawn above every element.
    pub overlay: Option<&'a str>,
}

/// Build the drawing document for `elements`, painted in ascending `z_index`.
///
/// Elements of an unknown type are skipped with a warning; any other
/// malformed element aborts the conversion.
///
/// # Errors
///
/// Returns [`RenderError::InvalidElement`] for elements with non-finite
/// geometry, negative sizes, bad colors or a non-positive font size.
pub fn build_document(elements: &[Element], opts: &DocumentOptions<'_>) -> RenderResult<DrawDocument> {
    let (w, h) = (opts.width, opts.height);
    let shape_rendering = if opts.anti_aliasing {
        "geometricPrecision"
    } else {
        "crispEdges"
    };

    let mut svg = String::with_capacity(256 + elements.len() * 256);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" shape-rendering=\"{shape_rendering}\" text-rendering=\"geometricPrecision\" image-rendering=\"optimizeQuality\">",
    );

    let mut painted = 0;
    let mut skipped = 0;
    for element in paint_order(elements) {
        if element_svg(&mut svg, element, opts.selected == Some(element.id))? {
            painted += 1;
        } else {
            skipped += 1;
        }
    }

    if let Some(overlay) = opts.overlay {
        svg.push_str(overlay);
    }
    svg.push_str("</svg>");

    Ok(DrawDocument {
        svg,
        painted,
        skipped,
    })
}

/// Write one element. Returns `false` if it was skipped.
fn element_svg(svg: &mut String, element: &Element, selected: bool) -> RenderResult<bool> {
    let t = &element.transform;
    let geometry = [t.x, t.y, t.width, t.height, t.angle];
    if geometry.iter().any(|v| !v.is_finite()) {
        return Err(RenderError::invalid(element.id, "non-finite geometry"));
    }
    if t.width < 0.0 || t.height < 0.0 {
        return Err(RenderError::invalid(element.id, "negative size"));
    }

    if let ElementKind::Unsupported { type_name, .. } = &element.kind {
        tracing::warn!("Skipping element {} of unsupported type '{type_name}'", element.id);
        return Ok(false);
    }

    tracing::trace!(
        "Paint {} at ({}, {}) size {}x{} angle {} z {}",
        element.kind.type_name(),
        t.x,
        t.y,
        t.width,
        t.height,
        t.angle,
        t.z_index
    );

    let (cx, cy) = t.center();
    let _ = write!(svg, "<g transform=\"rotate({} {cx} {cy})\">", t.angle);

    match &element.kind {
        ElementKind::Text(props) => text_svg(svg, element, props)?,
        ElementKind::Shape(props) => shape_svg(svg, element, props)?,
        ElementKind::Image(props) => image_svg(svg, element, props),
        ElementKind::Unsupported { .. } => {}
    }

    if selected {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{SELECTION_COLOR}\" stroke-width=\"1.5\" stroke-dasharray=\"6 4\" stroke-linejoin=\"round\"/>",
            t.x, t.y, t.width, t.height,
        );
    }

    svg.push_str("</g>");
    Ok(true)
}

fn color_attr(element: &Element, field: &str, value: &str) -> RenderResult<Rgba> {
    parse_color(value)
        .ok_or_else(|| RenderError::invalid(element.id, format!("bad {field} color '{value}'")))
}

fn text_svg(svg: &mut String, element: &Element, props: &TextProps) -> RenderResult<()> {
    if !(props.font_size.is_finite() && props.font_size > 0.0) {
        return Err(RenderError::invalid(
            element.id,
            format!("bad font size {}", props.font_size),
        ));
    }
    let color = color_attr(element, "text", &props.color)?;
    let t = &element.transform;

    let (x, anchor) = match props.align {
        TextAlign::Left => (t.x, "start"),
        TextAlign::Center => (t.x + t.width / 2.0, "middle"),
        TextAlign::Right => (t.x + t.width, "end"),
    };
    let weight = match props.font_weight {
        FontWeight::Normal => "normal",
        FontWeight::Bold => "bold",
    };
    let style = match props.font_style {
        FontStyle::Normal => "normal",
        FontStyle::Italic => "italic",
    };

    let _ = write!(
        svg,
        "<text font-size=\"{}\" font-family=\"{}\" font-weight=\"{weight}\" font-style=\"{style}\" fill=\"{}\" fill-opacity=\"{}\" text-anchor=\"{anchor}\">",
        props.font_size,
        escape_xml(&props.font_family),
        color.hex(),
        color.opacity(),
    );
    let line_height = props.font_size * LINE_HEIGHT;
    for (i, line) in props.content.lines().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = t.y + props.font_size + line_height * i as f32;
        let _ = write!(svg, "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape_xml(line));
    }
    svg.push_str("</text>");
    Ok(())
}

fn shape_svg(svg: &mut String, element: &Element, props: &ShapeProps) -> RenderResult<()> {
    if !(props.stroke_width.is_finite() && props.stroke_width >= 0.0) {
        return Err(RenderError::invalid(
            element.id,
            format!("bad stroke width {}", props.stroke_width),
        ));
    }
    let fill = color_attr(element, "fill", &props.fill)?;
    let stroke = color_attr(element, "stroke", &props.stroke)?;
    let t = &element.transform;

    let paint = format!(
        "fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"",
        fill.hex(),
        fill.opacity(),
        stroke.hex(),
        if props.stroke_width > 0.0 { stroke.opacity() } else { 0.0 },
        props.stroke_width,
    );

    match props.shape {
        ShapeKind::Rect => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {paint}/>",
                t.x, t.y, t.width, t.height,
            );
        }
        ShapeKind::Circle => {
            let (cx, cy) = t.center();
            let _ = write!(
                svg,
                "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{}\" ry=\"{}\" {paint}/>",
                t.width / 2.0,
                t.height / 2.0,
            );
        }
    }
    Ok(())
}

fn image_svg(svg: &mut String, element: &Element, props: &ImageProps) {
    let t = &element.transform;
    if props.src.trim().is_empty() {
        // Nothing to load: draw a labelled placeholder box.
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#f3f4f6\" stroke=\"#9ca3af\" stroke-width=\"1\" stroke-dasharray=\"4 4\"/>",
            t.x, t.y, t.width, t.height,
        );
        let label = if props.alt.is_empty() { "Image" } else { &props.alt };
        let (cx, cy) = t.center();
        let _ = write!(
            svg,
            "<text x=\"{cx}\" y=\"{cy}\" font-size=\"14\" fill=\"#6b7280\" text-anchor=\"middle\" font-family=\"sans-serif\">{}</text>",
            escape_xml(label),
        );
        return;
    }

    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"{}\"/>",
        t.x,
        t.y,
        t.width,
        t.height,
        escape_xml(&props.src),
    );
}

/// Escape special XML characters.
///
/// Characters outside the XML 1.0 `Char` production are dropped, since no
/// escape makes them legal.
pub(crate) fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{fffe}' || c == '\u{ffff}' => {}
            c => out.push(c),
        }
    }
    out
}
