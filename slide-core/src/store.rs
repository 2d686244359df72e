//! Slide storage.
//!
//! The canvas engine never owns slide data. It talks to a [`SlideStore`]
//! injected at construction, which is the single source of truth and tells
//! subscribers when a slide changes.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::{Element, ElementId, ElementPatch, Slide, SlideError, SlideId};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested slide does not exist.
    #[error("Slide not found: {0}")]
    SlideNotFound(SlideId),
    /// The requested element does not exist on the slide.
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    /// An error occurred while manipulating the slide.
    #[error("Slide error: {0}")]
    Slide(#[from] SlideError),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A change made to a slide in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideChange {
    /// An element was added.
    ElementAdded {
        /// Slide that changed.
        slide_id: SlideId,
        /// The new element.
        element_id: ElementId,
    },
    /// An element was patched.
    ElementUpdated {
        /// Slide that changed.
        slide_id: SlideId,
        /// The patched element.
        element_id: ElementId,
    },
    /// An element was deleted.
    ElementDeleted {
        /// Slide that changed.
        slide_id: SlideId,
        /// The removed element.
        element_id: ElementId,
    },
    /// The whole slide was replaced or cleared.
    SlideReplaced {
        /// Slide that changed.
        slide_id: SlideId,
    },
}

impl SlideChange {
    /// The slide this change applies to.
    #[must_use]
    pub fn slide_id(&self) -> SlideId {
        match *self {
            Self::ElementAdded { slide_id, .. }
            | Self::ElementUpdated { slide_id, .. }
            | Self::ElementDeleted { slide_id, .. }
            | Self::SlideReplaced { slide_id } => slide_id,
        }
    }
}

/// Callback invoked after every store mutation.
pub type ChangeListener = Arc<dyn Fn(&SlideChange) + Send + Sync>;

/// Handle returned by [`SlideStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The store interface the canvas engine is built against.
pub trait SlideStore {
    /// Elements of a slide in insertion order. Unknown slides are empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn elements(&self, slide_id: SlideId) -> Result<Vec<Element>, StoreError>;

    /// Add an element to a slide.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be stored.
    fn add_element(&self, slide_id: SlideId, element: Element) -> Result<ElementId, StoreError>;

    /// Apply a partial update to an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the slide or element does not exist.
    fn update_element(
        &self,
        slide_id: SlideId,
        id: ElementId,
        patch: &ElementPatch,
    ) -> Result<(), StoreError>;

    /// Delete an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the slide or element does not exist.
    fn delete_element(&self, slide_id: SlideId, id: ElementId) -> Result<(), StoreError>;

    /// Register a change listener.
    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId;

    /// Remove a change listener. Unknown IDs are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Thread-safe in-memory slide store with optional JSON persistence.
///
/// # Example
///
/// ```
/// use slide_core::store::{MemorySlideStore, SlideStore};
/// use slide_core::{Element, ElementKind, TextProps};
///
/// let store = MemorySlideStore::new();
/// let element = Element::new(ElementKind::Text(TextProps::default()));
/// let id = store.add_element(1, element).unwrap();
/// assert_eq!(store.elements(1).unwrap()[0].id, id);
/// ```
#[derive(Clone, Default)]
pub struct MemorySlideStore {
    slides: Arc<RwLock<HashMap<SlideId, Slide>>>,
    listeners: Arc<RwLock<Vec<(SubscriptionId, ChangeListener)>>>,
    next_subscription: Arc<AtomicU64>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl fmt::Debug for MemorySlideStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slides = self
            .slides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len();
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len();
        f.debug_struct("MemorySlideStore")
            .field("slides", &slides)
            .field("listeners", &listeners)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl MemorySlideStore {
    /// Create an empty store without persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// Slides are saved as `slide-<id>.json` in `data_dir`. The directory is
    /// created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir: Some(data_dir),
            ..Self::default()
        })
    }

    /// Get a copy of a slide if it exists.
    #[must_use]
    pub fn slide(&self, slide_id: SlideId) -> Option<Slide> {
        let slides = self
            .slides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slides.get(&slide_id).cloned()
    }

    /// Get a list of all slide IDs in ascending order.
    #[must_use]
    pub fn slide_ids(&self) -> Vec<SlideId> {
        let slides = self
            .slides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut ids: Vec<_> = slides.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert or replace a whole slide.
    pub fn insert_slide(&self, slide: Slide) {
        let slide_id = slide.id;
        {
            let mut slides = self
                .slides
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slides.insert(slide_id, slide);
        }
        self.persist_slide(slide_id);
        self.notify(&SlideChange::SlideReplaced { slide_id });
    }

    /// Remove every element from a slide.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SlideNotFound`] if the slide does not exist.
    pub fn clear(&self, slide_id: SlideId) -> Result<(), StoreError> {
        self.with_slide_mut(slide_id, |slide| {
            slide.clear();
            Ok(())
        })?;
        self.notify(&SlideChange::SlideReplaced { slide_id });
        Ok(())
    }

    /// Store a rendered thumbnail for a slide.
    ///
    /// Thumbnails do not notify subscribers; they are derived from the
    /// elements and would otherwise trigger a repaint loop.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SlideNotFound`] if the slide does not exist.
    pub fn set_thumbnail(&self, slide_id: SlideId, thumbnail: Option<String>) -> Result<(), StoreError> {
        self.with_slide_mut(slide_id, |slide| {
            slide.thumbnail = thumbnail;
            Ok(())
        })
    }

    fn with_slide_mut<T>(
        &self,
        slide_id: SlideId,
        f: impl FnOnce(&mut Slide) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let result = {
            let mut slides = self
                .slides
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let slide = slides
                .get_mut(&slide_id)
                .ok_or(StoreError::SlideNotFound(slide_id))?;
            f(slide)?
        };
        self.persist_slide(slide_id);
        Ok(result)
    }

    /// Call every listener. Runs outside the slide lock so listeners may read
    /// the store.
    fn notify(&self, change: &SlideChange) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn slide_path(&self, slide_id: SlideId) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("slide-{slide_id}.json")))
    }

    /// Save a slide to disk as JSON.
    ///
    /// No-op if the store was created without a data directory.
    fn persist_slide(&self, slide_id: SlideId) {
        let Some(path) = self.slide_path(slide_id) else {
            return;
        };
        let Some(slide) = self.slide(slide_id) else {
            return;
        };
        let json = match serde_json::to_string_pretty(&slide) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize slide {slide_id}: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!(
                "Failed to persist slide {slide_id} to {}: {e}",
                path.display()
            );
        }
    }

    /// Load a single slide from disk into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is configured, or the file
    /// doesn't exist or can't be parsed.
    pub fn load_slide_from_disk(&self, slide_id: SlideId) -> Result<(), StoreError> {
        let path = self
            .slide_path(slide_id)
            .ok_or_else(|| StoreError::Serialization("No data directory configured".into()))?;
        let contents = std::fs::read_to_string(&path)?;
        let slide: Slide =
            serde_json::from_str(&contents).map_err(|e| StoreError::Serialization(e.to_string()))?;

        {
            let mut slides = self
                .slides
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slides.insert(slide_id, slide);
        }
        self.notify(&SlideChange::SlideReplaced { slide_id });
        Ok(())
    }

    /// Discover and load all persisted slides from the data directory.
    ///
    /// Returns the IDs that were loaded, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory can't be read or a slide file
    /// can't be parsed.
    pub fn load_all_slides(&self) -> Result<Vec<SlideId>, StoreError> {
        let data_dir = self
            .data_dir
            .as_ref()
            .ok_or_else(|| StoreError::Serialization("No data directory configured".into()))?;
        let mut slide_ids = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let id = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.strip_prefix("slide-"))
                    .and_then(|s| s.parse::<SlideId>().ok());
                if let Some(id) = id {
                    slide_ids.push(id);
                }
            }
        }
        slide_ids.sort_unstable();
        for &id in &slide_ids {
            self.load_slide_from_disk(id)?;
        }
        Ok(slide_ids)
    }
}

impl SlideStore for MemorySlideStore {
    fn elements(&self, slide_id: SlideId) -> Result<Vec<Element>, StoreError> {
        let slides = self
            .slides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(slides
            .get(&slide_id)
            .map(|slide| slide.elements().to_vec())
            .unwrap_or_default())
    }

    fn add_element(&self, slide_id: SlideId, element: Element) -> Result<ElementId, StoreError> {
        let element_id = {
            let mut slides = self
                .slides
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            slides
                .entry(slide_id)
                .or_insert_with(|| Slide::new(slide_id))
                .add_element(element)?
        };
        self.persist_slide(slide_id);
        self.notify(&SlideChange::ElementAdded {
            slide_id,
            element_id,
        });
        Ok(element_id)
    }

    fn update_element(
        &self,
        slide_id: SlideId,
        id: ElementId,
        patch: &ElementPatch,
    ) -> Result<(), StoreError> {
        self.with_slide_mut(slide_id, |slide| {
            slide
                .update_element(id, patch)
                .map_err(|_| StoreError::ElementNotFound(id.to_string()))
        })?;
        self.notify(&SlideChange::ElementUpdated {
            slide_id,
            element_id: id,
        });
        Ok(())
    }

    fn delete_element(&self, slide_id: SlideId, id: ElementId) -> Result<(), StoreError> {
        self.with_slide_mut(slide_id, |slide| {
            slide
                .remove_element(id)
                .map(|_| ())
                .map_err(|_| StoreError::ElementNotFound(id.to_string()))
        })?;
        self.notify(&SlideChange::ElementDeleted {
            slide_id,
            element_id: id,
        });
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|(sub, _)| *sub != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ShapeProps, TextProps};
    use std::sync::Mutex;

    fn text(content: &str) -> Element {
        Element::new(ElementKind::Text(TextProps {
            content: content.to_string(),
            ..TextProps::default()
        }))
    }

    #[test]
    fn test_unknown_slide_is_empty() {
        let store = MemorySlideStore::new();
        assert!(store.elements(9).expect("read").is_empty());
        assert!(store.slide(9).is_none());
    }

    #[test]
    fn test_add_and_read_round_trip() {
        let store = MemorySlideStore::new();
        let element = text("Hello");
        let id = store.add_element(1, element.clone()).expect("add");

        let elements = store.elements(1).expect("read");
        assert_eq!(elements.iter().filter(|e| e.id == id).count(), 1);
        assert_eq!(elements[0], element);

        store.delete_element(1, id).expect("delete");
        assert!(store.elements(1).expect("read").iter().all(|e| e.id != id));
    }

    #[test]
    fn test_update_and_delete_missing() {
        let store = MemorySlideStore::new();
        let id = ElementId::new();
        assert!(matches!(
            store.update_element(1, id, &ElementPatch::default()),
            Err(StoreError::SlideNotFound(1))
        ));

        store.add_element(1, text("a")).expect("add");
        assert!(matches!(
            store.delete_element(1, id),
            Err(StoreError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_update_element_patch() {
        let store = MemorySlideStore::new();
        let id = store
            .add_element(1, Element::new(ElementKind::Shape(ShapeProps::default())))
            .expect("add");
        store
            .update_element(1, id, &ElementPatch::angle(90.0))
            .expect("update");
        assert_eq!(store.elements(1).expect("read")[0].transform.angle, 90.0);
    }

    #[test]
    fn test_listeners_notified_and_unsubscribed() {
        let store = MemorySlideStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(Arc::new(move |change: &SlideChange| {
            sink.lock().expect("lock").push(*change);
        }));

        let id = store.add_element(3, text("x")).expect("add");
        store.delete_element(3, id).expect("delete");
        store.unsubscribe(sub);
        store.add_element(3, text("y")).expect("add");

        let seen = seen.lock().expect("lock");
        assert_eq!(
            *seen,
            vec![
                SlideChange::ElementAdded {
                    slide_id: 3,
                    element_id: id
                },
                SlideChange::ElementDeleted {
                    slide_id: 3,
                    element_id: id
                },
            ]
        );
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = MemorySlideStore::new();
        let reader = store.clone();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        store.subscribe(Arc::new(move |change: &SlideChange| {
            let n = reader.elements(change.slide_id()).expect("read").len();
            sink.lock().expect("lock").push(n);
        }));

        store.add_element(1, text("a")).expect("add");
        store.add_element(1, text("b")).expect("add");
        assert_eq!(*counts.lock().expect("lock"), vec![1, 2]);
    }

    #[test]
    fn test_clear_and_thumbnail() {
        let store = MemorySlideStore::new();
        store.add_element(2, text("a")).expect("add");
        store
            .set_thumbnail(2, Some("data:image/png;base64,AAAA".to_string()))
            .expect("thumb");
        store.clear(2).expect("clear");

        let slide = store.slide(2).expect("slide");
        assert!(slide.is_empty());
        assert!(slide.thumbnail.is_some());
        assert!(store.clear(99).is_err());
    }

    #[test]
    fn test_persistence_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemorySlideStore::with_data_dir(dir.path()).expect("store");
        let id = store.add_element(5, text("persisted")).expect("add");
        assert!(dir.path().join("slide-5.json").exists());

        let reloaded = MemorySlideStore::with_data_dir(dir.path()).expect("store");
        assert_eq!(reloaded.load_all_slides().expect("load"), vec![5]);
        let elements = reloaded.elements(5).expect("read");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].id, id);
    }

    #[test]
    fn test_load_without_data_dir_fails() {
        let store = MemorySlideStore::new();
        assert!(store.load_slide_from_disk(1).is_err());
        assert!(store.load_all_slides().is_err());
    }
}
