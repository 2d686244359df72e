//! Z-order and rotation operations.
//!
//! These functions compute new values from the current element list; the
//! caller writes them back through the store.

use crate::{Element, ElementId};

/// Rotation applied by one rotate action, in degrees.
pub const ROTATION_STEP: f32 = 90.0;

/// Stacking index for a new element: one above everything on the slide.
#[must_use]
pub fn next_z_index(elements: &[Element]) -> i64 {
    elements
        .iter()
        .map(|e| e.transform.z_index)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// New `z_index` that puts `id` above every other element.
///
/// Returns `None` if `id` is not in `elements`.
#[must_use]
pub fn bring_to_front(elements: &[Element], id: ElementId) -> Option<i64> {
    elements.iter().any(|e| e.id == id).then(|| next_z_index(elements))
}

/// New `z_index` that puts `id` below every other element.
///
/// Returns `None` if `id` is not in `elements`.
#[must_use]
pub fn send_to_back(elements: &[Element], id: ElementId) -> Option<i64> {
    if !elements.iter().any(|e| e.id == id) {
        return None;
    }
    elements
        .iter()
        .map(|e| e.transform.z_index)
        .min()
        .map(|min| min.saturating_sub(1))
}

/// Angle after one rotation step, normalized to `[0, 360)`.
#[must_use]
pub fn rotate(angle: f32) -> f32 {
    (angle + ROTATION_STEP).rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{paint_order, ElementKind, ElementPatch, ShapeProps};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn shapes(zs: &[i64]) -> Vec<Element> {
        zs.iter()
            .map(|&z| Element::new(ElementKind::Shape(ShapeProps::default())).with_z_index(z))
            .collect()
    }

    #[test]
    fn test_next_z_index() {
        assert_eq!(next_z_index(&[]), 0);
        assert_eq!(next_z_index(&shapes(&[4, -2, 9])), 10);
    }

    #[test]
    fn test_send_to_back_goes_below_minimum() {
        let elements = shapes(&[1, 2, 3]);
        let z = send_to_back(&elements, elements[0].id).expect("present");
        assert_eq!(z, 0);
        assert!(send_to_back(&elements, ElementId::new()).is_none());
    }

    #[test]
    fn test_bring_to_front_goes_above_maximum() {
        let elements = shapes(&[1, 2, 3]);
        let z = bring_to_front(&elements, elements[0].id).expect("present");
        assert_eq!(z, 4);
        assert!(bring_to_front(&elements, ElementId::new()).is_none());
    }

    #[test]
    fn test_rotate_wraps() {
        assert_eq!(rotate(0.0), 90.0);
        assert_eq!(rotate(270.0), 0.0);
        assert_eq!(rotate(315.0), 45.0);
    }

    proptest! {
        #[test]
        fn prop_layering_keeps_strict_order(
            initial in prop::collection::vec(-5i64..5i64, 1..8),
            ops in prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 0..20)
        ) {
            let mut elements = shapes(&initial);
            for (front, pick) in ops {
                let id = elements[pick.index(elements.len())].id;
                let z = if front {
                    bring_to_front(&elements, id)
                } else {
                    send_to_back(&elements, id)
                }
                .expect("present");
                let target = elements.iter_mut().find(|e| e.id == id).expect("present");
                ElementPatch::z_index(z).apply(target);

                let ordered = paint_order(&elements);
                if front {
                    prop_assert_eq!(ordered.last().map(|e| e.id), Some(id));
                } else {
                    prop_assert_eq!(ordered.first().map(|e| e.id), Some(id));
                }
            }

            // Paint order is a permutation of the elements: no element is
            // painted twice and none is dropped.
            let ordered = paint_order(&elements);
            let ids: HashSet<_> = ordered.iter().map(|e| e.id).collect();
            prop_assert_eq!(ordered.len(), elements.len());
            prop_assert_eq!(ids.len(), elements.len());
        }
    }
}
