//! The content client capability.

use contentsync_model::{Asset, Entry, ModelError, NodeKey};
use std::sync::Arc;
use thiserror::Error;

/// Result type for content client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures reported by a content client.
///
/// These are ordinary values: the resolver turns a failed fetch into a
/// dropped edge and the sync engine turns a failed write into an error record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The item does not exist in the environment.
    #[error("{key} not found")]
    NotFound {
        /// Key of the missing item.
        key: NodeKey,
    },

    /// The request could not be carried out.
    #[error("request failed: {message}")]
    Request {
        /// Error message.
        message: String,
    },

    /// The backend refused the request.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// Response status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// An identifier or locale cannot be used as a URL path segment.
    #[error("invalid path segment {segment:?}")]
    InvalidPath {
        /// The rejected value.
        segment: String,
    },

    /// The client lacks a setting required for the call.
    #[error("not configured: {what}")]
    NotConfigured {
        /// Name of the missing setting.
        what: String,
    },
}

impl ClientError {
    /// Creates a request failure.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Returns true if the item was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        ClientError::Decode {
            message: err.to_string(),
        }
    }
}

/// Reads items from the source environment and writes them to the target.
///
/// Each call performs one logical read or write. Writes are create-or-update:
/// the client decides which based on whether the item already exists.
pub trait ContentClient: Send + Sync {
    /// Reads one entry from the source environment.
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry>;

    /// Reads one asset from the source environment.
    fn fetch_asset(&self, id: &str) -> ClientResult<Asset>;

    /// Creates or updates an entry in the target environment.
    fn write_entry(&self, entry: &Entry) -> ClientResult<()>;

    /// Creates or updates an asset in the target environment, including any
    /// processing the backend needs before the asset is usable.
    fn write_asset(&self, asset: &Asset) -> ClientResult<()>;
}

impl<C: ContentClient + ?Sized> ContentClient for &C {
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
        (**self).fetch_entry(id)
    }

    fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
        (**self).fetch_asset(id)
    }

    fn write_entry(&self, entry: &Entry) -> ClientResult<()> {
        (**self).write_entry(entry)
    }

    fn write_asset(&self, asset: &Asset) -> ClientResult<()> {
        (**self).write_asset(asset)
    }
}

impl<C: ContentClient + ?Sized> ContentClient for Arc<C> {
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
        (**self).fetch_entry(id)
    }

    fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
        (**self).fetch_asset(id)
    }

    fn write_entry(&self, entry: &Entry) -> ClientResult<()> {
        (**self).write_entry(entry)
    }

    fn write_asset(&self, asset: &Asset) -> ClientResult<()> {
        (**self).write_asset(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_display() {
        let err = ClientError::NotFound {
            key: NodeKey::entry("missing"),
        };
        assert_eq!(err.to_string(), "entry:missing not found");
        assert!(err.is_not_found());

        let err = ClientError::Rejected {
            status: 422,
            message: "validation failed".into(),
        };
        assert_eq!(err.to_string(), "rejected with status 422: validation failed");
        assert!(!err.is_not_found());

        let err = ClientError::InvalidPath {
            segment: "a/b".into(),
        };
        assert_eq!(err.to_string(), r#"invalid path segment "a/b""#);
    }

    #[test]
    fn model_errors_become_decode_errors() {
        let err: ClientError = ModelError::UnknownKind("tag".into()).into();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
