//! Slide documents as an external store would hand them over.

use slide_core::{
    DisplayCapabilities, DisplaySignals, ElementKind, MemorySlideStore, ResolutionPlanner,
    ShapeKind, Slide, SlideStore, TextAlign,
};

const DOCUMENT: &str = r##"{
  "id": 3,
  "elements": [
    {
      "id": "0b7f1d2e-4c1a-4b8e-9d2f-1a2b3c4d5e6f",
      "type": "shape",
      "props": {"shape": "circle", "fill": "#ff000080"},
      "transform": {"x": 100, "y": 100, "width": 200, "height": 200, "z_index": 2}
    },
    {
      "id": "1c8e2f3a-5d2b-4c9f-8e3a-2b3c4d5e6f70",
      "type": "text",
      "props": {"content": "Agenda", "align": "center", "font_size": 48},
      "transform": {"x": 40, "y": 20, "width": 400, "height": 60, "angle": 90, "z_index": 5}
    },
    {
      "id": "2d9f3a4b-6e3c-4da0-9f4b-3c4d5e6f7081",
      "type": "video",
      "props": {"src": "clip.mp4"},
      "transform": {"x": 0, "y": 0, "width": 10, "height": 10}
    }
  ]
}"##;

#[test]
fn document_loads_with_defaults_and_foreign_types() {
    let slide = Slide::from_json(DOCUMENT).expect("slide");
    assert_eq!(slide.id, 3);
    assert_eq!(slide.element_count(), 3);
    assert!(slide.thumbnail.is_none());

    let kinds: Vec<_> = slide.elements().iter().map(|e| e.kind.type_name().to_string()).collect();
    assert_eq!(kinds, ["shape", "text", "video"]);

    match &slide.elements()[0].kind {
        ElementKind::Shape(props) => {
            assert_eq!(props.shape, ShapeKind::Circle);
            assert_eq!(props.fill, "#ff000080");
            // Unspecified props take defaults.
            assert!((props.stroke_width - 2.0).abs() < f32::EPSILON);
        }
        other => panic!("unexpected kind {other:?}"),
    }
    match &slide.elements()[1].kind {
        ElementKind::Text(props) => assert_eq!(props.align, TextAlign::Center),
        other => panic!("unexpected kind {other:?}"),
    }
    assert!(!slide.elements()[2].kind.is_supported());
}

#[test]
fn document_survives_a_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = MemorySlideStore::with_data_dir(dir.path()).expect("store");
    store.insert_slide(Slide::from_json(DOCUMENT).expect("slide"));

    let reopened = MemorySlideStore::with_data_dir(dir.path()).expect("store");
    assert_eq!(reopened.load_all_slides().expect("load"), vec![3]);

    let original = Slide::from_json(DOCUMENT).expect("slide");
    assert_eq!(reopened.elements(3).expect("elements"), original.elements());
}

#[test]
fn paint_order_and_hit_testing() {
    let slide = Slide::from_json(DOCUMENT).expect("slide");
    let order: Vec<_> = slide.paint_order().iter().map(|e| e.transform.z_index).collect();
    assert_eq!(order, [0, 2, 5]);

    // The rotated text box stands upright around its center (240, 50).
    let text_id = slide.elements()[1].id;
    assert_eq!(slide.element_at(240.0, 200.0), Some(text_id));
    assert_eq!(slide.element_at(60.0, 50.0), None);

    // Inside the circle's box, below the text.
    let circle_id = slide.elements()[0].id;
    assert_eq!(slide.element_at(150.0, 250.0), Some(circle_id));
}

#[test]
fn probe_then_plan() {
    let caps = DisplayCapabilities::probe(&DisplaySignals {
        device_pixel_ratio: Some(2.5),
        screen_width: Some(1920),
        screen_height: Some(1080),
    });
    let profile = ResolutionPlanner::default()
        .plan(1600.0, 1600.0, &caps)
        .expect("profile");

    // Width-limited: 1600 x 900 letterboxed into the square container.
    assert_eq!(profile.base_width, 1600);
    assert_eq!(profile.base_height, 900);
    assert!(profile.scale <= caps.max_scale());
    assert_eq!(profile.display_width, profile.base_width);
}
