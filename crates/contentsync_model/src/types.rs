//! Identity types for content items.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of content items a graph can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A structured content item with a content type.
    Entry,
    /// A media item; assets never link to anything.
    Asset,
}

impl ItemKind {
    /// Returns the lowercase name used in keys and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemKind::Entry => "entry",
            ItemKind::Asset => "asset",
        }
    }

    /// Returns the `linkType` value the backend uses for this kind.
    #[must_use]
    pub const fn link_type(self) -> &'static str {
        match self {
            ItemKind::Entry => "Entry",
            ItemKind::Asset => "Asset",
        }
    }

    /// Parses a backend `linkType` value.
    pub fn from_link_type(link_type: &str) -> Option<Self> {
        match link_type {
            "Entry" => Some(ItemKind::Entry),
            "Asset" => Some(ItemKind::Asset),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entry" => Ok(ItemKind::Entry),
            "asset" => Ok(ItemKind::Asset),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

/// Composite identity of a graph node.
///
/// An entry and an asset may share an identifier string; the kind keeps
/// them apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    /// Item kind.
    pub kind: ItemKind,
    /// Item identifier.
    pub id: String,
}

impl NodeKey {
    /// Creates a new key.
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Creates an entry key.
    pub fn entry(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Entry, id)
    }

    /// Creates an asset key.
    pub fn asset(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Asset, id)
    }

    /// Returns true if this key names an asset.
    #[must_use]
    pub fn is_asset(&self) -> bool {
        self.kind == ItemKind::Asset
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
