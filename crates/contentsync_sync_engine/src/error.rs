//! Per-item failure records.

use contentsync_model::ItemKind;
use serde::Serialize;
use thiserror::Error;

/// A single item that could not be written.
///
/// Failures are collected in the run report; they never stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{item_type} {item_id}: {message}")]
pub struct SyncItemError {
    /// Identifier of the item.
    pub item_id: String,
    /// Kind of the item.
    pub item_type: ItemKind,
    /// What went wrong.
    pub message: String,
}

impl SyncItemError {
    /// Creates a failure record.
    pub fn new(item_id: impl Into<String>, item_type: ItemKind, message: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            item_type,
            message: message.into(),
        }
    }
}
