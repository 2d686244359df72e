//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An element cannot be converted to drawing operations.
    #[error("Invalid element {id}: {reason}")]
    InvalidElement {
        /// Offending element ID.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The backing surface is missing or could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The generated drawing document could not be parsed.
    #[error("Drawing document rejected: {0}")]
    Document(String),

    /// Export or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl RenderError {
    /// Shorthand for [`RenderError::InvalidElement`].
    pub(crate) fn invalid(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidElement {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
