//! A slide and its ordered element list.

use serde::{Deserialize, Serialize};

use crate::{Element, ElementId, ElementPatch, SlideError, SlideResult};

/// Identifier of a slide within a deck.
pub type SlideId = u32;

/// A slide containing drawable elements.
///
/// Elements are kept in insertion order; paint order is derived from
/// `z_index` with insertion order breaking ties. Element IDs are unique,
/// including for slides loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSlide")]
pub struct Slide {
    /// Slide identifier.
    pub id: SlideId,
    /// Elements in insertion order.
    #[serde(default)]
    elements: Vec<Element>,
    /// Rendered preview, as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Wire form of a slide, before element IDs are checked.
#[derive(Deserialize)]
struct RawSlide {
    id: SlideId,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl TryFrom<RawSlide> for Slide {
    type Error = SlideError;

    fn try_from(raw: RawSlide) -> SlideResult<Self> {
        let mut slide = Slide::new(raw.id);
        slide.thumbnail = raw.thumbnail;
        for element in raw.elements {
            slide.add_element(element)?;
        }
        Ok(slide)
    }
}

impl Slide {
    /// Create a new empty slide.
    #[must_use]
    pub fn new(id: SlideId) -> Self {
        Self {
            id,
            elements: Vec::new(),
            thumbnail: None,
        }
    }

    /// Add an element to the slide.
    ///
    /// # Errors
    ///
    /// Returns an error if an element with the same ID is already present.
    pub fn add_element(&mut self, element: Element) -> SlideResult<ElementId> {
        let id = element.id;
        if self.elements.iter().any(|e| e.id == id) {
            return Err(SlideError::DuplicateElement(id.to_string()));
        }
        self.elements.push(element);
        Ok(id)
    }

    /// Remove an element from the slide.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> SlideResult<Element> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SlideError::ElementNotFound(id.to_string()))?;
        Ok(self.elements.remove(index))
    }

    /// Apply a partial update to an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> SlideResult<()> {
        let element = self
            .get_element_mut(id)
            .ok_or_else(|| SlideError::ElementNotFound(id.to_string()))?;
        patch.apply(element);
        Ok(())
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements in paint order (back to front).
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        paint_order(&self.elements)
    }

    /// Find the topmost element under a point in base coordinates.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(x, y))
            .map(|e| e.id)
    }

    /// Get the number of elements on the slide.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the slide has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the slide to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SlideResult<String> {
        serde_json::to_string(self).map_err(SlideError::Serialization)
    }

    /// Deserialize a slide from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails, or
    /// [`SlideError::DuplicateElement`] if two elements share an ID.
    pub fn from_json(json: &str) -> SlideResult<Self> {
        let raw: RawSlide = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

/// Sort elements back to front.
///
/// The sort is stable, so elements with equal `z_index` keep their relative
/// insertion order and the result is always a strict total order.
#[must_use]
pub fn paint_order(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<_> = elements.iter().collect();
    ordered.sort_by_key(|e| e.transform.z_index);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ShapeProps, TextProps};

    fn shape(z: i64) -> Element {
        Element::new(ElementKind::Shape(ShapeProps::default())).with_z_index(z)
    }

    #[test]
    fn test_slide_add_remove() {
        let mut slide = Slide::new(1);
        assert!(slide.is_empty());

        let element = Element::new(ElementKind::Text(TextProps::default()));
        let id = slide.add_element(element).expect("should add");

        assert_eq!(slide.element_count(), 1);
        assert!(slide.get_element(id).is_some());

        slide.remove_element(id).expect("should remove");
        assert!(slide.is_empty());
        assert!(slide.remove_element(id).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut slide = Slide::new(1);
        let element = shape(0);
        slide.add_element(element.clone()).expect("first add");
        assert!(matches!(
            slide.add_element(element),
            Err(SlideError::DuplicateElement(_))
        ));
    }

    #[test]
    fn test_duplicate_id_rejected_on_load() {
        let mut slide = Slide::new(7);
        let element = shape(0);
        slide.add_element(element.clone()).expect("add");
        let single = slide.to_json().expect("json");
        let twin = serde_json::to_value(&element).expect("element json");
        let doubled = serde_json::json!({
            "id": 7,
            "elements": [twin.clone(), twin],
        })
        .to_string();

        assert!(matches!(
            Slide::from_json(&doubled),
            Err(SlideError::DuplicateElement(_))
        ));
        assert!(serde_json::from_str::<Slide>(&doubled).is_err());
        assert_eq!(Slide::from_json(&single).expect("single"), slide);
    }

    #[test]
    fn test_paint_order_breaks_ties_by_insertion() {
        let mut slide = Slide::new(1);
        let a = slide.add_element(shape(5)).expect("add");
        let b = slide.add_element(shape(1)).expect("add");
        let c = slide.add_element(shape(5)).expect("add");

        let order: Vec<_> = slide.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_element_at_prefers_topmost() {
        let mut slide = Slide::new(1);
        let low = slide
            .add_element(shape(1).with_position(0.0, 0.0))
            .expect("add");
        let high = slide
            .add_element(shape(2).with_position(50.0, 50.0))
            .expect("add");

        assert_eq!(slide.element_at(75.0, 75.0), Some(high));
        assert_eq!(slide.element_at(25.0, 25.0), Some(low));
        assert_eq!(slide.element_at(500.0, 500.0), None);
    }

    #[test]
    fn test_update_element() {
        let mut slide = Slide::new(1);
        let id = slide.add_element(shape(0)).expect("add");
        slide
            .update_element(id, &ElementPatch::position(7.0, 8.0))
            .expect("update");

        let element = slide.get_element(id).expect("present");
        assert_eq!((element.transform.x, element.transform.y), (7.0, 8.0));
        assert!(slide
            .update_element(ElementId::new(), &ElementPatch::default())
            .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut slide = Slide::new(4);
        slide.add_element(shape(3)).expect("add");
        let json = slide.to_json().expect("to json");
        let back = Slide::from_json(&json).expect("from json");
        assert_eq!(back, slide);
    }
}
