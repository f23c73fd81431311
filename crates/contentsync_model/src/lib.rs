//! # Contentsync Model
//!
//! Data model shared by the dependency resolver and the sync engine.
//!
//! This crate provides:
//! - `FieldValue`, a tagged union over field data where links are a first-class variant
//! - `Fields`, an ordered field map (document order is preserved)
//! - `Entry`, `Asset` and `ContentItem`
//! - `ItemKind` and `NodeKey`, the composite identity of a graph node
//! - Wire shapes for the backend's `{ sys, fields }` JSON
//!
//! ## Link recognition
//!
//! Any object of the shape `{ "sys": { "type": "Link", "linkType": "Entry" | "Asset", "id": .. } }`
//! decodes to `FieldValue::Link`, wherever it is nested. Objects that almost match
//! (missing `id`, unknown `linkType`) stay ordinary maps.
//!
//! ```
//! use contentsync_model::{FieldValue, ItemKind};
//!
//! let value: FieldValue = serde_json::from_str(
//!     r#"{"en-US": [{"sys": {"type": "Link", "linkType": "Asset", "id": "hero"}}]}"#,
//! )
//! .unwrap();
//!
//! let links = value.links();
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].kind, ItemKind::Asset);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod item;
mod types;
mod value;
pub mod wire;

pub use error::{ModelError, ModelResult};
pub use item::{Asset, ContentItem, Entry, ItemMetadata};
pub use types::{ItemKind, NodeKey};
pub use value::{FieldValue, Fields, Link};

/// Locale used when a caller does not name one.
pub const DEFAULT_LOCALE: &str = "en-US";
