//! Error types for the content model.

use crate::types::ItemKind;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or decoding content items.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The string does not name an item kind.
    #[error("unknown item kind: {0}")]
    UnknownKind(String),

    /// A decoded item is missing data the model requires.
    #[error("invalid {kind} {id}: {message}")]
    InvalidItem {
        /// Kind of the offending item.
        kind: ItemKind,
        /// Identifier of the offending item.
        id: String,
        /// What is wrong with it.
        message: String,
    },

    /// JSON could not be parsed into the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::UnknownKind("tag".into());
        assert_eq!(err.to_string(), "unknown item kind: tag");

        let err = ModelError::InvalidItem {
            kind: ItemKind::Entry,
            id: "page-1".into(),
            message: "missing content type".into(),
        };
        assert_eq!(err.to_string(), "invalid entry page-1: missing content type");
    }
}
