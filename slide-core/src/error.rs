//! Error types for slide operations.

use thiserror::Error;

/// Result type for slide operations.
pub type SlideResult<T> = Result<T, SlideError>;

/// Errors that can occur in slide operations.
#[derive(Debug, Error)]
pub enum SlideError {
    /// Element not found on the slide.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An element with the same ID already exists on the slide.
    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// The container cannot hold a slide of the requested aspect ratio.
    #[error("Invalid container size {width}x{height}")]
    InvalidContainer {
        /// Container width in CSS pixels.
        width: f64,
        /// Container height in CSS pixels.
        height: f64,
    },

    /// Slide serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while persisting state.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
