//! JSON shapes of the content backend.
//!
//! The management API and export files describe every item as
//! `{ "sys": { .. }, "fields": { .. } }`. These types mirror that layout and
//! convert to and from the flat model types.

use crate::error::{ModelError, ModelResult};
use crate::item::{Asset, Entry, ItemMetadata};
use crate::types::ItemKind;
use crate::value::Fields;
use serde::{Deserialize, Serialize};

/// `{ "id": .. }` inside a `sys` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysId {
    /// Referenced identifier.
    pub id: String,
}

/// `{ "sys": { "id": .. } }` reference, used for content types and environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysRef {
    /// Reference body.
    pub sys: SysId,
}

impl SysRef {
    /// Creates a reference to `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            sys: SysId { id: id.into() },
        }
    }
}

/// The `sys` block of an entry or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSys {
    /// Item identifier.
    pub id: String,
    /// `Entry` or `Asset`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Content type reference (entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<SysRef>,
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

impl WireSys {
    fn metadata(&self) -> ItemMetadata {
        ItemMetadata {
            version: self.version,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            published_at: self.published_at.clone(),
        }
    }

    fn from_parts(
        id: &str,
        kind: ItemKind,
        content_type: Option<&str>,
        metadata: &ItemMetadata,
    ) -> Self {
        Self {
            id: id.to_string(),
            item_type: Some(kind.link_type().to_string()),
            content_type: content_type.map(SysRef::new),
            version: metadata.version,
            created_at: metadata.created_at.clone(),
            updated_at: metadata.updated_at.clone(),
            published_at: metadata.published_at.clone(),
        }
    }
}

/// Wire form of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntry {
    /// System block.
    pub sys: WireSys,
    /// Field values.
    #[serde(default)]
    pub fields: Fields,
}

impl TryFrom<WireEntry> for Entry {
    type Error = ModelError;

    fn try_from(wire: WireEntry) -> ModelResult<Self> {
        let metadata = wire.sys.metadata();
        let content_type = wire.sys.content_type.ok_or_else(|| ModelError::InvalidItem {
            kind: ItemKind::Entry,
            id: wire.sys.id.clone(),
            message: "missing content type".into(),
        })?;

        Ok(Entry {
            id: wire.sys.id,
            content_type: content_type.sys.id,
            fields: wire.fields,
            metadata,
        })
    }
}

impl From<&Entry> for WireEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            sys: WireSys::from_parts(
                &entry.id,
                ItemKind::Entry,
                Some(&entry.content_type),
                &entry.metadata,
            ),
            fields: entry.fields.clone(),
        }
    }
}

/// Wire form of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAsset {
    /// System block.
    pub sys: WireSys,
    /// Field values.
    #[serde(default)]
    pub fields: Fields,
}

impl From<WireAsset> for Asset {
    fn from(wire: WireAsset) -> Self {
        Asset {
            metadata: wire.sys.metadata(),
            id: wire.sys.id,
            fields: wire.fields,
        }
    }
}

impl From<&Asset> for WireAsset {
    fn from(asset: &Asset) -> Self {
        Self {
            sys: WireSys::from_parts(&asset.id, ItemKind::Asset, None, &asset.metadata),
            fields: asset.fields.clone(),
        }
    }
}

/// Request body for a create-or-update call: fields only.
#[derive(Debug, Clone, Serialize)]
pub struct WireFieldsBody<'a> {
    /// Field values to store.
    pub fields: &'a Fields,
}

/// A content export: every entry and asset of one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireExport {
    /// Exported entries.
    #[serde(default)]
    pub entries: Vec<WireEntry>,
    /// Exported assets.
    #[serde(default)]
    pub assets: Vec<WireAsset>,
}

/// A paged collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireCollection<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of items, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// An environment of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvironment {
    /// System block.
    pub sys: SysId,
    /// Display name.
    pub name: String,
}

/// Decodes an entry from response bytes.
pub fn decode_entry(bytes: &[u8]) -> ModelResult<Entry> {
    let wire: WireEntry = serde_json::from_slice(bytes)?;
    Entry::try_from(wire)
}

/// Decodes an asset from response bytes.
pub fn decode_asset(bytes: &[u8]) -> ModelResult<Asset> {
    let wire: WireAsset = serde_json::from_slice(bytes)?;
    Ok(Asset::from(wire))
}

/// Reads only the `sys` block of an item response.
pub fn decode_sys(bytes: &[u8]) -> ModelResult<WireSys> {
    #[derive(Deserialize)]
    struct SysOnly {
        sys: WireSys,
    }

    let only: SysOnly = serde_json::from_slice(bytes)?;
    Ok(only.sys)
}
