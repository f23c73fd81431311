//! Dynamic field value type.

use crate::types::{ItemKind, NodeKey};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A reference embedded in a field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Kind of the linked item.
    pub kind: ItemKind,
    /// Identifier of the linked item.
    pub id: String,
}

impl Link {
    /// Creates a link to an entry.
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Entry,
            id: id.into(),
        }
    }

    /// Creates a link to an asset.
    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Asset,
            id: id.into(),
        }
    }

    /// Returns the graph key of the link target.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind, self.id.clone())
    }

    /// Recognizes the `{ "sys": { "type": "Link", "linkType": .., "id": .. } }` shape.
    ///
    /// Returns `None` for anything else, including near misses such as a link
    /// without an `id` or with a `linkType` other than `Entry`/`Asset`.
    pub fn from_fields(fields: &Fields) -> Option<Self> {
        let sys = fields.get("sys")?.as_map()?;
        if sys.get("type")?.as_str()? != "Link" {
            return None;
        }
        let kind = ItemKind::from_link_type(sys.get("linkType")?.as_str()?)?;
        let id = sys.get("id")?.as_str()?;
        Some(Self {
            kind,
            id: id.to_string(),
        })
    }
}

/// A dynamic field value.
///
/// Field data is semi-structured: scalars, ordered sequences and keyed maps,
/// nested to any depth. Links are lifted out of the map case at decode time
/// so that finding them is a plain walk over this enum.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value, kept in its JSON representation.
    Number(serde_json::Number),
    /// Text value.
    Text(String),
    /// Ordered sequence of values.
    Array(Vec<FieldValue>),
    /// Keyed map in document order.
    Map(Fields),
    /// Reference to an entry or asset.
    Link(Link),
}

impl FieldValue {
    /// Builds a value from a decoded map, recognizing link shapes.
    pub fn from_map(fields: Fields) -> Self {
        match Link::from_fields(&fields) {
            Some(link) => FieldValue::Link(link),
            None => FieldValue::Map(fields),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get this value as a link, if it is one.
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            FieldValue::Link(link) => Some(link),
            _ => None,
        }
    }

    /// Returns every link reachable from this value, in document order.
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        self.collect_links(&mut out);
        out
    }

    /// Appends every link reachable from this value to `out`.
    pub fn collect_links<'a>(&'a self, out: &mut Vec<&'a Link>) {
        match self {
            FieldValue::Link(link) => out.push(link),
            FieldValue::Array(items) => {
                for item in items {
                    item.collect_links(out);
                }
            }
            FieldValue::Map(fields) => fields.collect_links(out),
            FieldValue::Null
            | FieldValue::Bool(_)
            | FieldValue::Number(_)
            | FieldValue::Text(_) => {}
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Link> for FieldValue {
    fn from(value: Link) -> Self {
        FieldValue::Link(value)
    }
}

impl From<Fields> for FieldValue {
    fn from(value: Fields) -> Self {
        FieldValue::Map(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        FieldValue::Array(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => FieldValue::Number(n),
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::from_map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// An ordered map from field name to value.
///
/// Keys keep the order they were decoded or inserted in; link discovery
/// follows that order.
///
/// Lookups scan the fields, which suits the handful of fields an item
/// carries. Decoding and [`FromIterator`] build the map in linear time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Inserts a field, replacing an existing one in place.
    ///
    /// Returns the previous value if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Looks up a localized field.
    ///
    /// Localized fields are maps keyed by locale. Returns the value for
    /// `locale`, or the first value present when that locale is missing.
    pub fn localized(&self, name: &str, locale: &str) -> Option<&FieldValue> {
        let per_locale = self.get(name)?.as_map()?;
        per_locale
            .get(locale)
            .or_else(|| per_locale.0.first().map(|(_, v)| v))
    }

    /// Returns every link reachable from these fields, in document order.
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        self.collect_links(&mut out);
        out
    }

    fn collect_links<'a>(&'a self, out: &mut Vec<&'a Link>) {
        for (_, value) in &self.0 {
            value.collect_links(out);
        }
    }
}

/// A repeated name replaces the earlier value in place.
impl FromIterator<(String, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut entries: Vec<(String, FieldValue)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for (name, value) in iter {
            match slots.get(&name) {
                Some(&slot) => entries[slot].1 = value,
                None => {
                    slots.insert(name.clone(), entries.len());
                    entries.push((name, value));
                }
            }
        }
        Fields(entries)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct LinkSys<'a> {
            #[serde(rename = "type")]
            sys_type: &'static str,
            #[serde(rename = "linkType")]
            link_type: &'static str,
            id: &'a str,
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "sys",
            &LinkSys {
                sys_type: "Link",
                link_type: self.kind.link_type(),
                id: &self.id,
            },
        )?;
        map.end()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Map(fields) => fields.serialize(serializer),
            FieldValue::Link(link) => link.serialize(serializer),
        }
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn read_map<'de, A: MapAccess<'de>>(mut access: A) -> Result<Fields, A::Error> {
    let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
    while let Some(entry) = access.next_entry::<String, FieldValue>()? {
        entries.push(entry);
    }
    Ok(entries.into_iter().collect())
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-like field value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(FieldValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(FieldValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(FieldValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // Non-finite floats have no JSON form.
        Ok(serde_json::Number::from_f64(v).map_or(FieldValue::Null, FieldValue::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(FieldValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        FieldValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(FieldValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        read_map(map).map(FieldValue::from_map)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct FieldsVisitor;

impl<'de> Visitor<'de> for FieldsVisitor {
    type Value = Fields;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        read_map(map)
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldsVisitor)
    }
}
