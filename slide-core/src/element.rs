//! Slide elements - the drawable objects of a slide.

use std::str::FromStr;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::SlideError;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = SlideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| SlideError::InvalidOperation(format!("invalid element id '{s}': {e}")))
    }
}

/// Font weight of a text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font style of a text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered in the box.
    Center,
    /// Flush with the right edge.
    Right,
}

/// Properties of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProps {
    /// Text content. Newlines start a new line.
    pub content: String,
    /// Font size in base pixels.
    pub font_size: f32,
    /// Text color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub color: String,
    /// Font family name.
    pub font_family: String,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font style.
    pub font_style: FontStyle,
    /// Horizontal alignment.
    pub align: TextAlign,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: "Click to edit text".to_string(),
            font_size: 24.0,
            color: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            align: TextAlign::Left,
        }
    }
}

/// Geometry of a shape element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle filling the element box.
    #[default]
    Rect,
    /// Ellipse inscribed in the element box.
    Circle,
}

/// Properties of a shape element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeProps {
    /// Shape geometry.
    pub shape: ShapeKind,
    /// Fill color.
    pub fill: String,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width in base pixels. Zero disables the stroke.
    pub stroke_width: f32,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Rect,
            fill: "#3b82f6".to_string(),
            stroke: "#1e40af".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Properties of an image element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageProps {
    /// Image source: a data URI or a path the renderer can resolve.
    pub src: String,
    /// Alternate text, drawn when the source is empty.
    pub alt: String,
}

/// The type of content an element contains.
///
/// Serialized adjacently tagged as `{"type": "...", "props": {...}}`.
/// Unknown `type` values load as [`ElementKind::Unsupported`] so one foreign
/// element does not reject a whole slide.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A text box.
    Text(TextProps),
    /// A rectangle or circle.
    Shape(ShapeProps),
    /// A raster or vector image.
    Image(ImageProps),
    /// An element whose type this engine does not know.
    Unsupported {
        /// The type discriminant as found in the source document.
        type_name: String,
        /// The untouched property bag.
        props: serde_json::Value,
    },
}

impl ElementKind {
    /// Type discriminant as it appears in serialized form.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
            Self::Image(_) => "image",
            Self::Unsupported { type_name, .. } => type_name,
        }
    }

    /// Whether the engine knows how to draw this kind.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

#[derive(Serialize)]
struct TaggedKindRef<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    props: serde_json::Value,
}

#[derive(Deserialize)]
struct TaggedKind {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    props: serde_json::Value,
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let props = match self {
            Self::Text(p) => serde_json::to_value(p),
            Self::Shape(p) => serde_json::to_value(p),
            Self::Image(p) => serde_json::to_value(p),
            Self::Unsupported { props, .. } => Ok(props.clone()),
        }
        .map_err(S::Error::custom)?;

        TaggedKindRef {
            type_name: self.type_name(),
            props,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = TaggedKind::deserialize(deserializer)?;
        // A missing props bag means "all defaults".
        let props = if raw.props.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            raw.props
        };

        match raw.type_name.as_str() {
            "text" => serde_json::from_value(props)
                .map(Self::Text)
                .map_err(D::Error::custom),
            "shape" => serde_json::from_value(props)
                .map(Self::Shape)
                .map_err(D::Error::custom),
            "image" => serde_json::from_value(props)
                .map(Self::Image)
                .map_err(D::Error::custom),
            _ => Ok(Self::Unsupported {
                type_name: raw.type_name,
                props,
            }),
        }
    }
}

/// Position, size, rotation and stacking of an element.
///
/// Coordinates are in base (unscaled) slide units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (base pixels from left).
    pub x: f32,
    /// Y position (base pixels from top).
    pub y: f32,
    /// Width in base pixels.
    pub width: f32,
    /// Height in base pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise, in `[0, 360)`.
    #[serde(default)]
    pub angle: f32,
    /// Stacking index. Lower values paint first.
    #[serde(default)]
    pub z_index: i64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            angle: 0.0,
            z_index: 0,
        }
    }
}

impl Transform {
    /// Center of the element box.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A slide element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier within the slide.
    pub id: ElementId,
    /// Element content type.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Position, size, rotation and stacking.
    pub transform: Transform,
}

impl Element {
    /// Create a new element with the given kind and a fresh ID.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            transform: Transform::default(),
        }
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.transform.width = width;
        self.transform.height = height;
        self
    }

    /// Set the stacking index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.transform.z_index = z_index;
        self
    }

    /// Check if a point (in base coordinates) is within this element.
    ///
    /// The point is rotated into the element's local frame first, so rotated
    /// elements hit-test against their drawn outline.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let t = &self.transform;
        let (cx, cy) = t.center();
        let (sin, cos) = (-t.angle.to_radians()).sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        let local_x = dx * cos - dy * sin;
        let local_y = dx * sin + dy * cos;
        local_x.abs() <= t.width / 2.0 && local_y.abs() <= t.height / 2.0
    }
}

/// A partial update of an element. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    /// Replacement content.
    pub kind: Option<ElementKind>,
    /// New X position.
    pub x: Option<f32>,
    /// New Y position.
    pub y: Option<f32>,
    /// New width.
    pub width: Option<f32>,
    /// New height.
    pub height: Option<f32>,
    /// New rotation in degrees.
    pub angle: Option<f32>,
    /// New stacking index.
    pub z_index: Option<i64>,
}

impl ElementPatch {
    /// Patch that moves an element to a new position.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that only changes the stacking index.
    #[must_use]
    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Patch that only changes the rotation.
    #[must_use]
    pub fn angle(angle: f32) -> Self {
        Self {
            angle: Some(angle),
            ..Self::default()
        }
    }

    /// Apply the patch to an element in place.
    pub fn apply(&self, element: &mut Element) {
        if let Some(kind) = &self.kind {
            element.kind = kind.clone();
        }
        let t = &mut element.transform;
        if let Some(x) = self.x {
            t.x = x;
        }
        if let Some(y) = self.y {
            t.y = y;
        }
        if let Some(width) = self.width {
            t.width = width;
        }
        if let Some(height) = self.height {
            t.height = height;
        }
        if let Some(angle) = self.angle {
            t.angle = angle;
        }
        if let Some(z_index) = self.z_index {
            t.z_index = z_index;
        }
    }
}
