//! Integration tests for the render pipeline.
//!
//! Paints real frames and checks backing-store pixels, verifying that base
//! coordinates are multiplied by the device scale exactly once.

use slide_core::{Element, ElementKind, ResolutionProfile, ShapeKind, ShapeProps, Transform};
use slide_renderer::{Frame, RenderPipeline, RendererConfig};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn filled(fill: &str, x: f32, y: f32, width: f32, height: f32) -> Element {
    Element::new(ElementKind::Shape(ShapeProps {
        shape: ShapeKind::Rect,
        fill: fill.to_string(),
        stroke: "transparent".to_string(),
        stroke_width: 0.0,
    }))
    .with_transform(Transform {
        x,
        y,
        width,
        height,
        angle: 0.0,
        z_index: 0,
    })
}

fn pipeline(scale: f64) -> RenderPipeline {
    let mut pipeline = RenderPipeline::new(RendererConfig {
        load_system_fonts: false,
        ..RendererConfig::default()
    });
    pipeline
        .set_profile(&ResolutionProfile::from_base(160, 90, scale))
        .expect("profile");
    pipeline
}

fn paint(pipeline: &mut RenderPipeline, elements: &[Element]) {
    pipeline
        .render(&Frame {
            elements,
            selected: None,
            editable: false,
        })
        .expect("frame");
}

#[test]
fn base_coordinates_are_scaled_once() {
    let mut pipeline = pipeline(2.0);
    paint(&mut pipeline, &[filled("#ff0000", 10.0, 20.0, 30.0, 40.0)]);

    let surface = pipeline.surface().expect("surface");
    assert_eq!(surface.backing_size(), (320, 180));
    assert_eq!(surface.display_size(), (160, 90));

    // Inside the rect, in backing pixels.
    assert_eq!(surface.pixel(25 * 2, 40 * 2), Some(RED));
    assert_eq!(surface.pixel(12 * 2, 22 * 2), Some(RED));
    // A rect scaled twice would cover this pixel.
    assert_eq!(surface.pixel(45 * 2, 40 * 2), Some(WHITE));
    assert_eq!(surface.pixel(5 * 2, 5 * 2), Some(WHITE));
}

#[test]
fn scale_one_maps_directly() {
    let mut pipeline = pipeline(1.0);
    paint(&mut pipeline, &[filled("#0000ff", 100.0, 50.0, 20.0, 20.0)]);

    let surface = pipeline.surface().expect("surface");
    assert_eq!(surface.backing_size(), (160, 90));
    assert_eq!(surface.pixel(110, 60), Some(BLUE));
    assert_eq!(surface.pixel(90, 60), Some(WHITE));
}

#[test]
fn higher_z_index_paints_on_top() {
    let mut pipeline = pipeline(2.0);
    let top = filled("#ff0000", 20.0, 20.0, 40.0, 40.0).with_z_index(5);
    let bottom = filled("#0000ff", 30.0, 30.0, 40.0, 40.0).with_z_index(1);
    paint(&mut pipeline, &[top, bottom]);

    let surface = pipeline.surface().expect("surface");
    // Overlap region.
    assert_eq!(surface.pixel(45 * 2, 45 * 2), Some(RED));
    // Blue only.
    assert_eq!(surface.pixel(65 * 2, 65 * 2), Some(BLUE));
}

#[test]
fn equal_z_index_keeps_insertion_order() {
    let mut pipeline = pipeline(1.0);
    let first = filled("#ff0000", 20.0, 20.0, 40.0, 40.0);
    let second = filled("#0000ff", 30.0, 30.0, 40.0, 40.0);
    paint(&mut pipeline, &[first, second]);

    let surface = pipeline.surface().expect("surface");
    assert_eq!(surface.pixel(45, 45), Some(BLUE));
}

#[test]
fn rotation_turns_about_center() {
    let mut pipeline = pipeline(2.0);
    let mut bar = filled("#ff0000", 60.0, 40.0, 40.0, 10.0);
    bar.transform.angle = 90.0;
    paint(&mut pipeline, &[bar]);

    let surface = pipeline.surface().expect("surface");
    // Rotated bar spans x 75..85, y 25..65 in base units.
    assert_eq!(surface.pixel(80 * 2, 30 * 2), Some(RED));
    assert_eq!(surface.pixel(65 * 2, 45 * 2), Some(WHITE));
}

#[test]
fn unsupported_elements_do_not_stop_the_frame() {
    let mut pipeline = pipeline(1.0);
    let chart = Element::new(ElementKind::Unsupported {
        type_name: "chart".to_string(),
        props: serde_json::json!({"series": []}),
    });
    let stats = pipeline
        .render(&Frame {
            elements: &[chart, filled("#0000ff", 0.0, 0.0, 10.0, 10.0)],
            selected: None,
            editable: true,
        })
        .expect("frame");

    assert_eq!(stats.painted, 1);
    assert_eq!(stats.skipped, 1);
    assert!(pipeline.is_ready());
    assert_eq!(pipeline.surface().and_then(|s| s.pixel(5, 5)), Some(BLUE));
}

#[test]
fn resize_repaints_at_new_scale() {
    let mut pipeline = pipeline(1.0);
    let elements = [filled("#ff0000", 10.0, 10.0, 10.0, 10.0)];
    paint(&mut pipeline, &elements);

    pipeline
        .set_profile(&ResolutionProfile::from_base(160, 90, 3.0))
        .expect("profile");
    paint(&mut pipeline, &elements);

    let surface = pipeline.surface().expect("surface");
    assert_eq!(surface.backing_size(), (480, 270));
    assert_eq!(surface.pixel(15 * 3, 15 * 3), Some(RED));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn element_centers_land_at_scaled_coordinates(
            scale in prop::sample::select(vec![1.0f64, 1.5, 2.0, 3.0]),
            x in 0u16..120,
            y in 0u16..60,
        ) {
            let mut pipeline = pipeline(scale);
            let (x, y) = (f32::from(x), f32::from(y));
            paint(&mut pipeline, &[filled("#ff0000", x, y, 20.0, 20.0)]);

            let surface = pipeline.surface().expect("surface");
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let at = |v: f32| (f64::from(v + 10.0) * scale) as u32;
            prop_assert_eq!(surface.pixel(at(x), at(y)), Some(RED));
        }
    }
}
