//! Property-based test generators using proptest.
//!
//! Generates random content sets: entries drawn from a small pool of content
//! types, linking each other and a pool of assets at random, with cycles,
//! shared references and dangling links all likely to occur.

use contentsync_core::MemoryContentClient;
use contentsync_model::{Asset, Entry, FieldValue, Fields, Link, DEFAULT_LOCALE};
use proptest::prelude::*;

/// Content types entries are drawn from.
pub const CONTENT_TYPES: [&str; 4] = ["page", "section", "card", "teaser"];

/// Identifier of the link target that never exists.
pub const MISSING_ID: &str = "missing";

/// Identifier of the `index`-th generated entry.
pub fn entry_id(index: usize) -> String {
    format!("entry-{index}")
}

/// Identifier of the `index`-th generated asset.
pub fn asset_id(index: usize) -> String {
    format!("asset-{index}")
}

/// A generated set of items. The root is always `entry-0`.
#[derive(Debug, Clone)]
pub struct ContentSet {
    /// Entries, `entry-0` first.
    pub entries: Vec<Entry>,
    /// Assets.
    pub assets: Vec<Asset>,
}

impl ContentSet {
    /// Identifier to resolve from.
    pub fn root(&self) -> &str {
        &self.entries[0].id
    }

    /// Loads the set into a fresh in-memory client.
    pub fn client(&self) -> MemoryContentClient {
        let client = MemoryContentClient::new();
        for entry in &self.entries {
            client.add_entry(entry.clone());
        }
        for asset in &self.assets {
            client.add_asset(asset.clone());
        }
        client
    }
}

/// Strategy for one link among `entries` entries and `assets` assets.
pub fn link_strategy(entries: usize, assets: usize) -> impl Strategy<Value = Link> {
    let assets = assets.max(1);
    prop_oneof![
        4 => (0..entries).prop_map(|i| Link::entry(entry_id(i))),
        3 => (0..assets).prop_map(|i| Link::asset(asset_id(i))),
        1 => Just(Link::entry(MISSING_ID)),
    ]
}

/// Strategy for a content set of up to `max_entries` entries and
/// `max_assets` assets.
///
/// Each entry gets up to four links, split between a top-level list field
/// and a nested object.
pub fn content_set_strategy(
    max_entries: usize,
    max_assets: usize,
) -> impl Strategy<Value = ContentSet> {
    (1..=max_entries.max(1), 0..=max_assets)
        .prop_flat_map(|(entries, assets)| {
            let shape = (
                0..CONTENT_TYPES.len(),
                prop::collection::vec(link_strategy(entries, assets), 0..5),
                any::<bool>(),
            );
            (prop::collection::vec(shape, entries), Just(assets))
        })
        .prop_map(|(shapes, assets)| ContentSet {
            entries: shapes
                .into_iter()
                .enumerate()
                .map(|(i, (content_type, links, nest))| {
                    build_entry(i, CONTENT_TYPES[content_type], links, nest)
                })
                .collect(),
            assets: (0..assets).map(|i| Asset::new(asset_id(i))).collect(),
        })
}

fn build_entry(index: usize, content_type: &str, links: Vec<Link>, nest: bool) -> Entry {
    let mut values: Vec<FieldValue> = links.into_iter().map(FieldValue::Link).collect();
    let nested = if nest && !values.is_empty() {
        values.split_off(values.len() / 2)
    } else {
        Vec::new()
    };

    let mut refs = Fields::new();
    refs.insert(DEFAULT_LOCALE, values);

    let mut body = Fields::new();
    body.insert("blocks", nested);
    let mut body_field = Fields::new();
    body_field.insert(DEFAULT_LOCALE, body);

    let mut title = Fields::new();
    title.insert(DEFAULT_LOCALE, format!("Entry {index}"));

    Entry::new(entry_id(index), content_type)
        .with_field("title", title)
        .with_field("refs", refs)
        .with_field("body", body_field)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_sets_are_well_formed(set in content_set_strategy(8, 4)) {
            prop_assert!(!set.entries.is_empty());
            prop_assert_eq!(set.root(), "entry-0");
            for entry in &set.entries {
                prop_assert!(entry.links().len() <= 4);
                prop_assert!(CONTENT_TYPES.contains(&entry.content_type.as_str()));
            }
        }
    }
}
