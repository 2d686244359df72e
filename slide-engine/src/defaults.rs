//! Default placement of newly added elements, in base units.

use slide_core::{Element, ElementKind, ImageProps, ShapeKind, ShapeProps, TextProps, Transform};

/// Text boxes start here, sized for one line of default text.
pub const TEXT_BOX: (f32, f32, f32, f32) = (100.0, 100.0, 300.0, 60.0);

/// Rectangles start here.
pub const RECT_BOX: (f32, f32, f32, f32) = (200.0, 150.0, 150.0, 100.0);

/// Circles start here.
pub const CIRCLE_BOX: (f32, f32, f32, f32) = (200.0, 150.0, 120.0, 120.0);

/// Images start here.
pub const IMAGE_BOX: (f32, f32, f32, f32) = (250.0, 150.0, 200.0, 150.0);

fn placed(kind: ElementKind, (x, y, width, height): (f32, f32, f32, f32), z_index: i64) -> Element {
    Element::new(kind).with_transform(Transform {
        x,
        y,
        width,
        height,
        angle: 0.0,
        z_index,
    })
}

/// A default text element.
#[must_use]
pub fn text(z_index: i64) -> Element {
    placed(ElementKind::Text(TextProps::default()), TEXT_BOX, z_index)
}

/// A default shape element of the given kind.
#[must_use]
pub fn shape(shape: ShapeKind, z_index: i64) -> Element {
    let frame = match shape {
        ShapeKind::Rect => RECT_BOX,
        ShapeKind::Circle => CIRCLE_BOX,
    };
    placed(
        ElementKind::Shape(ShapeProps {
            shape,
            ..ShapeProps::default()
        }),
        frame,
        z_index,
    )
}

/// An image element. An empty `src` paints as a placeholder box.
#[must_use]
pub fn image(src: &str, alt: &str, z_index: i64) -> Element {
    placed(
        ElementKind::Image(ImageProps {
            src: src.to_string(),
            alt: alt.to_string(),
        }),
        IMAGE_BOX,
        z_index,
    )
}
