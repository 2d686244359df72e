//! First-use guidance flags.
//!
//! A tiny key/value store of "already shown" flags, the only state the
//! canvas engine persists itself.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::SlideResult;

/// Default key for the canvas onboarding hint.
pub const DEFAULT_GUIDANCE_KEY: &str = "slide-canvas.guidance-shown";

/// Storage for one-time guidance flags.
pub trait GuidanceStore {
    /// Whether the guidance under `key` was already shown.
    fn is_shown(&self, key: &str) -> bool;

    /// Record that the guidance under `key` was shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    fn mark_shown(&self, key: &str) -> SlideResult<()>;
}

/// Guidance flags kept in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryGuidanceStore {
    flags: Arc<RwLock<BTreeMap<String, bool>>>,
}

impl MemoryGuidanceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuidanceStore for MemoryGuidanceStore {
    fn is_shown(&self, key: &str) -> bool {
        self.flags
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(false)
    }

    fn mark_shown(&self, key: &str) -> SlideResult<()> {
        self.flags
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), true);
        Ok(())
    }
}

/// Guidance flags persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileGuidanceStore {
    path: PathBuf,
    cache: MemoryGuidanceStore,
}

impl FileGuidanceStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = MemoryGuidanceStore::new();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, bool>>(&contents) {
                Ok(flags) => {
                    *cache
                        .flags
                        .write()
                        .unwrap_or_else(std::sync::PoisonError::into_inner) = flags;
                }
                Err(e) => tracing::warn!("Ignoring corrupt guidance file {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to read guidance file {}: {e}", path.display()),
        }
        Self { path, cache }
    }
}

impl GuidanceStore for FileGuidanceStore {
    fn is_shown(&self, key: &str) -> bool {
        self.cache.is_shown(key)
    }

    fn mark_shown(&self, key: &str) -> SlideResult<()> {
        self.cache.mark_shown(key)?;
        let json = {
            let flags = self
                .cache
                .flags
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            serde_json::to_string_pretty(&*flags)?
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryGuidanceStore::new();
        assert!(!store.is_shown(DEFAULT_GUIDANCE_KEY));
        store.mark_shown(DEFAULT_GUIDANCE_KEY).expect("mark");
        assert!(store.is_shown(DEFAULT_GUIDANCE_KEY));
        assert!(!store.is_shown("other"));
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("guidance.json");

        let store = FileGuidanceStore::open(&path);
        assert!(!store.is_shown(DEFAULT_GUIDANCE_KEY));
        store.mark_shown(DEFAULT_GUIDANCE_KEY).expect("mark");

        let reopened = FileGuidanceStore::open(&path);
        assert!(reopened.is_shown(DEFAULT_GUIDANCE_KEY));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("guidance.json");
        std::fs::write(&path, "{ not json").expect("write");

        let store = FileGuidanceStore::open(&path);
        assert!(!store.is_shown(DEFAULT_GUIDANCE_KEY));
    }
}
