//! Test fixtures and content scenarios.
//!
//! Builders produce items with localized fields under the default locale,
//! shaped the way the backend returns them.

use contentsync_core::MemoryContentClient;
use contentsync_model::wire::{WireAsset, WireEntry, WireExport};
use contentsync_model::{Asset, Entry, FieldValue, Fields, Link, DEFAULT_LOCALE};

fn localized(value: impl Into<FieldValue>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(DEFAULT_LOCALE, value);
    fields
}

/// Builds an [`Entry`].
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: Entry,
}

impl EntryBuilder {
    /// Starts an entry with no fields.
    pub fn new(id: &str, content_type: &str) -> Self {
        Self {
            entry: Entry::new(id, content_type),
        }
    }

    /// Sets the `title` field.
    pub fn title(self, title: &str) -> Self {
        self.field("title", title)
    }

    /// Sets a localized field.
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.entry.fields.insert(name, localized(value));
        self
    }

    /// Sets a field holding a single link.
    pub fn link(self, name: &str, link: Link) -> Self {
        self.field(name, link)
    }

    /// Sets a field holding a list of links.
    pub fn links(self, name: &str, links: &[Link]) -> Self {
        let items: Vec<FieldValue> = links.iter().cloned().map(FieldValue::Link).collect();
        self.field(name, items)
    }

    /// Sets the version.
    pub fn version(mut self, version: u64) -> Self {
        self.entry.metadata.version = Some(version);
        self
    }

    /// Finishes the entry.
    pub fn build(self) -> Entry {
        self.entry
    }
}

/// Builds an [`Asset`].
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    asset: Asset,
    files: Fields,
}

impl AssetBuilder {
    /// Starts an asset with no fields.
    pub fn new(id: &str) -> Self {
        Self {
            asset: Asset::new(id),
            files: Fields::new(),
        }
    }

    /// Sets the `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.asset.fields.insert("title", localized(title));
        self
    }

    /// Adds a file for `locale`.
    pub fn file(mut self, locale: &str, file_name: &str, content_type: &str) -> Self {
        let mut file = Fields::new();
        file.insert("url", format!("//assets.test/{file_name}"));
        file.insert("fileName", file_name);
        file.insert("contentType", content_type);
        self.files.insert(locale, file);
        self
    }

    /// Finishes the asset.
    pub fn build(mut self) -> Asset {
        if !self.files.is_empty() {
            self.asset.fields.insert("file", self.files);
        }
        self.asset
    }
}

/// Starts an entry.
pub fn entry(id: &str, content_type: &str) -> EntryBuilder {
    EntryBuilder::new(id, content_type)
}

/// Starts an asset.
pub fn asset(id: &str) -> AssetBuilder {
    AssetBuilder::new(id)
}

/// A populated client and the entry to resolve from.
#[derive(Debug)]
pub struct Scenario {
    /// Client holding the scenario's items.
    pub client: MemoryContentClient,
    /// Root entry identifier.
    pub root: &'static str,
}

impl Scenario {
    fn new(root: &'static str, entries: Vec<Entry>, assets: Vec<Asset>) -> Self {
        let client = MemoryContentClient::new();
        for entry in entries {
            client.add_entry(entry);
        }
        for asset in assets {
            client.add_asset(asset);
        }
        Self { client, root }
    }
}

/// `entry-a` (page) links `entry-b` (section), which links back to `entry-a`.
pub fn direct_cycle() -> Scenario {
    Scenario::new(
        "entry-a",
        vec![
            entry("entry-a", "page")
                .title("Entry A")
                .link("next", Link::entry("entry-b"))
                .build(),
            entry("entry-b", "section")
                .title("Entry B")
                .link("back", Link::entry("entry-a"))
                .build(),
        ],
        vec![],
    )
}

/// `offer-1` (offer) → `homepage-1` (offerHomePage) → `offer-2` (offer) → `category-1`.
///
/// `offer-2` repeats the `offer` content type, so it is pruned and
/// `category-1` is never reached.
pub fn content_type_loop() -> Scenario {
    Scenario::new(
        "offer-1",
        vec![
            entry("offer-1", "offer")
                .title("Summer offer")
                .link("homepage", Link::entry("homepage-1"))
                .build(),
            entry("homepage-1", "offerHomePage")
                .title("Offers")
                .links("offers", &[Link::entry("offer-2")])
                .build(),
            entry("offer-2", "offer")
                .title("Winter offer")
                .link("category", Link::entry("category-1"))
                .build(),
            entry("category-1", "category").title("Seasonal").build(),
        ],
        vec![],
    )
}

/// `landing` links two columns that both link the `logo` asset and the
/// `footer` entry; `landing` also links its own `hero` asset.
pub fn shared_references() -> Scenario {
    Scenario::new(
        "landing",
        vec![
            entry("landing", "page")
                .title("Landing")
                .links(
                    "sections",
                    &[Link::entry("left"), Link::entry("right"), Link::asset("hero")],
                )
                .build(),
            entry("left", "column")
                .links("content", &[Link::asset("logo"), Link::entry("footer")])
                .build(),
            entry("right", "column")
                .links("content", &[Link::entry("footer"), Link::asset("logo")])
                .build(),
            entry("footer", "footer").title("Footer").build(),
        ],
        vec![
            asset("logo").title("Logo").file(DEFAULT_LOCALE, "logo.png", "image/png").build(),
            asset("hero").title("Hero").file(DEFAULT_LOCALE, "hero.jpg", "image/jpeg").build(),
        ],
    )
}

/// Serializes items as an export document.
pub fn export_json(entries: &[Entry], assets: &[Asset]) -> String {
    let export = WireExport {
        entries: entries.iter().map(WireEntry::from).collect(),
        assets: assets.iter().map(WireAsset::from).collect(),
    };
    serde_json::to_string_pretty(&export).expect("export serializes")
}
