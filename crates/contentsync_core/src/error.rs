//! Error types for graph resolution.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building a dependency graph.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The root entry could not be fetched.
    #[error("failed to resolve entry {id}: {reason}")]
    ResolutionFailed {
        /// Root entry identifier.
        id: String,
        /// Why the root could not be fetched.
        reason: String,
    },

    /// A hand-built graph is inconsistent.
    #[error("invalid graph: {message}")]
    InvalidGraph {
        /// Description of the inconsistency.
        message: String,
    },
}

impl CoreError {
    /// Creates a resolution failure for `id`.
    pub fn resolution_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
