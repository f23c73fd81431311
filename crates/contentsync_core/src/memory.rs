//! In-memory content client.

use crate::client::{ClientError, ClientResult, ContentClient};
use contentsync_model::{Asset, Entry, NodeKey};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, Entry>,
    assets: HashMap<String, Asset>,
}

/// A content client backed by two in-memory environments.
///
/// Fetches read the source environment; writes upsert into the target
/// environment and bump the item's version. Every fetch attempt and every
/// successful write is logged in call order, and individual keys can be made
/// to fail.
#[derive(Debug, Default)]
pub struct MemoryContentClient {
    source: RwLock<Store>,
    target: RwLock<Store>,
    fetch_log: Mutex<Vec<NodeKey>>,
    write_log: Mutex<Vec<NodeKey>>,
    failing_fetches: RwLock<HashSet<NodeKey>>,
    failing_writes: RwLock<HashMap<NodeKey, String>>,
}

impl MemoryContentClient {
    /// Creates a client with empty environments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry to the source environment.
    pub fn with_entry(self, entry: Entry) -> Self {
        self.add_entry(entry);
        self
    }

    /// Adds an asset to the source environment.
    pub fn with_asset(self, asset: Asset) -> Self {
        self.add_asset(asset);
        self
    }

    /// Adds or replaces an entry in the source environment.
    pub fn add_entry(&self, entry: Entry) {
        self.source.write().entries.insert(entry.id.clone(), entry);
    }

    /// Adds or replaces an asset in the source environment.
    pub fn add_asset(&self, asset: Asset) {
        self.source.write().assets.insert(asset.id.clone(), asset);
    }

    /// Makes every fetch of `key` fail.
    pub fn fail_fetch(&self, key: NodeKey) {
        self.failing_fetches.write().insert(key);
    }

    /// Makes every write of `key` fail with `message`.
    pub fn fail_write(&self, key: NodeKey, message: impl Into<String>) {
        self.failing_writes.write().insert(key, message.into());
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.failing_fetches.write().clear();
        self.failing_writes.write().clear();
    }

    /// Keys fetched so far, in call order.
    pub fn fetch_log(&self) -> Vec<NodeKey> {
        self.fetch_log.lock().clone()
    }

    /// Number of fetch attempts for `key`.
    pub fn fetch_count(&self, key: &NodeKey) -> usize {
        self.fetch_log.lock().iter().filter(|k| *k == key).count()
    }

    /// Keys written so far, in call order.
    pub fn write_log(&self) -> Vec<NodeKey> {
        self.write_log.lock().clone()
    }

    /// Reads an entry from the target environment.
    pub fn target_entry(&self, id: &str) -> Option<Entry> {
        self.target.read().entries.get(id).cloned()
    }

    /// Reads an asset from the target environment.
    pub fn target_asset(&self, id: &str) -> Option<Asset> {
        self.target.read().assets.get(id).cloned()
    }

    fn begin_fetch(&self, key: &NodeKey) -> ClientResult<()> {
        self.fetch_log.lock().push(key.clone());
        if self.failing_fetches.read().contains(key) {
            return Err(ClientError::request(format!("fetch of {key} failed")));
        }
        Ok(())
    }

    fn begin_write(&self, key: &NodeKey) -> ClientResult<()> {
        if let Some(message) = self.failing_writes.read().get(key) {
            return Err(ClientError::Rejected {
                status: 422,
                message: message.clone(),
            });
        }
        self.write_log.lock().push(key.clone());
        Ok(())
    }
}

fn next_version(current: Option<u64>) -> u64 {
    current.map_or(1, |v| v + 1)
}

impl ContentClient for MemoryContentClient {
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
        let key = NodeKey::entry(id);
        self.begin_fetch(&key)?;
        self.source
            .read()
            .entries
            .get(id)
            .cloned()
            .ok_or(ClientError::NotFound { key })
    }

    fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
        let key = NodeKey::asset(id);
        self.begin_fetch(&key)?;
        self.source
            .read()
            .assets
            .get(id)
            .cloned()
            .ok_or(ClientError::NotFound { key })
    }

    fn write_entry(&self, entry: &Entry) -> ClientResult<()> {
        self.begin_write(&entry.key())?;
        let mut target = self.target.write();
        let version = next_version(target.entries.get(&entry.id).and_then(|e| e.metadata.version));
        let mut stored = entry.clone();
        stored.metadata.version = Some(version);
        target.entries.insert(stored.id.clone(), stored);
        Ok(())
    }

    fn write_asset(&self, asset: &Asset) -> ClientResult<()> {
        self.begin_write(&asset.key())?;
        let mut target = self.target.write();
        let version = next_version(target.assets.get(&asset.id).and_then(|a| a.metadata.version));
        let mut stored = asset.clone();
        stored.metadata.version = Some(version);
        target.assets.insert(stored.id.clone(), stored);
        Ok(())
    }
}
