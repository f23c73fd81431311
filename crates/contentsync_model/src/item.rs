//! Entries, assets and their shared metadata.

use crate::types::{ItemKind, NodeKey};
use crate::value::{FieldValue, Fields, Link};
use serde::{Deserialize, Serialize};

/// Field names tried, in order, when picking a display title for an entry.
const TITLE_FIELDS: [&str; 4] = ["title", "name", "internalName", "slug"];

/// Version and timestamp metadata carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// Backend version counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Last publish timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// A structured content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Entry identifier.
    pub id: String,
    /// Content type identifier.
    pub content_type: String,
    /// Field values, possibly containing links.
    #[serde(default)]
    pub fields: Fields,
    /// Opaque metadata.
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl Entry {
    /// Creates an entry with no fields.
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            fields: Fields::new(),
            metadata: ItemMetadata::default(),
        }
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the graph key of this entry.
    pub fn key(&self) -> NodeKey {
        NodeKey::entry(self.id.clone())
    }

    /// Returns every link embedded in the entry's fields.
    pub fn links(&self) -> Vec<&Link> {
        self.fields.links()
    }

    /// Picks a human-readable title, falling back to the identifier.
    pub fn title(&self, locale: &str) -> &str {
        TITLE_FIELDS
            .iter()
            .find_map(|name| self.fields.localized(name, locale)?.as_str())
            .unwrap_or(&self.id)
    }
}

/// A media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier.
    pub id: String,
    /// Descriptive fields (title, description, file).
    #[serde(default)]
    pub fields: Fields,
    /// Opaque metadata.
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl Asset {
    /// Creates an asset with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
            metadata: ItemMetadata::default(),
        }
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Sets the metadata.
    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the graph key of this asset.
    pub fn key(&self) -> NodeKey {
        NodeKey::asset(self.id.clone())
    }

    /// Picks a human-readable title, falling back to the identifier.
    pub fn title(&self, locale: &str) -> &str {
        self.fields
            .localized("title", locale)
            .and_then(FieldValue::as_str)
            .unwrap_or(&self.id)
    }

    /// Locales that carry a file.
    pub fn file_locales(&self) -> Vec<&str> {
        self.fields
            .get("file")
            .and_then(FieldValue::as_map)
            .map(|files| files.keys().collect())
            .unwrap_or_default()
    }
}

/// Either kind of content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    /// An entry.
    Entry(Entry),
    /// An asset.
    Asset(Asset),
}

impl ContentItem {
    /// Returns the item kind.
    pub fn kind(&self) -> ItemKind {
        match self {
            ContentItem::Entry(_) => ItemKind::Entry,
            ContentItem::Asset(_) => ItemKind::Asset,
        }
    }

    /// Returns the item identifier.
    pub fn id(&self) -> &str {
        match self {
            ContentItem::Entry(entry) => &entry.id,
            ContentItem::Asset(asset) => &asset.id,
        }
    }

    /// Returns the graph key of this item.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind(), self.id())
    }

    /// Returns the item's fields.
    pub fn fields(&self) -> &Fields {
        match self {
            ContentItem::Entry(entry) => &entry.fields,
            ContentItem::Asset(asset) => &asset.fields,
        }
    }

    /// Returns the content type, or `None` for assets.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            ContentItem::Entry(entry) => Some(&entry.content_type),
            ContentItem::Asset(_) => None,
        }
    }

    /// Picks a human-readable title, falling back to the identifier.
    pub fn display_title(&self, locale: &str) -> &str {
        match self {
            ContentItem::Entry(entry) => entry.title(locale),
            ContentItem::Asset(asset) => asset.title(locale),
        }
    }

    /// Returns the entry, if this is one.
    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            ContentItem::Entry(entry) => Some(entry),
            ContentItem::Asset(_) => None,
        }
    }

    /// Returns the asset, if this is one.
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            ContentItem::Asset(asset) => Some(asset),
            ContentItem::Entry(_) => None,
        }
    }
}

impl From<Entry> for ContentItem {
    fn from(entry: Entry) -> Self {
        ContentItem::Entry(entry)
    }
}

impl From<Asset> for ContentItem {
    fn from(asset: Asset) -> Self {
        ContentItem::Asset(asset)
    }
}
