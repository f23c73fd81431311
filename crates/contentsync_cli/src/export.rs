//! Content client over export files.

use contentsync_core::{ClientError, ClientResult, ContentClient};
use contentsync_model::wire::{WireAsset, WireEntry, WireExport};
use contentsync_model::{Asset, Entry, ModelError, NodeKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors reading or writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The file is not a valid export document.
    #[error("{}: invalid export: {source}", path.display())]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// An item in the file is malformed.
    #[error("{}: {source}", path.display())]
    Item {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: ModelError,
    },
}

/// Items of one environment, in file order.
#[derive(Debug, Default)]
struct Environment {
    entries: Vec<Entry>,
    assets: Vec<Asset>,
}

impl Environment {
    fn load(path: &Path) -> Result<Self, ExportError> {
        let text = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let export: WireExport = serde_json::from_str(&text).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let entries = export
            .entries
            .into_iter()
            .map(Entry::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ExportError::Item {
                path: path.to_path_buf(),
                source,
            })?;
        let assets = export.assets.into_iter().map(Asset::from).collect();

        Ok(Self { entries, assets })
    }

    fn to_export(&self) -> WireExport {
        WireExport {
            entries: self.entries.iter().map(WireEntry::from).collect(),
            assets: self.assets.iter().map(WireAsset::from).collect(),
        }
    }
}

fn next_version(current: Option<u64>) -> Option<u64> {
    Some(current.map_or(1, |v| v + 1))
}

/// A content client that reads a source export file and upserts into a
/// target export file.
///
/// The target is held in memory and written back by [`ExportClient::save`].
pub struct ExportClient {
    entries: HashMap<String, Entry>,
    assets: HashMap<String, Asset>,
    target: RwLock<Environment>,
    target_path: Option<PathBuf>,
}

impl ExportClient {
    /// Loads the source export. A missing target file starts empty.
    pub fn open(source: &Path, target: Option<&Path>) -> Result<Self, ExportError> {
        let environment = Environment::load(source)?;
        debug!(
            path = %source.display(),
            entries = environment.entries.len(),
            assets = environment.assets.len(),
            "loaded source export"
        );

        let target_env = match target {
            Some(path) if path.exists() => Environment::load(path)?,
            _ => Environment::default(),
        };

        Ok(Self {
            entries: environment
                .entries
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
            assets: environment
                .assets
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect(),
            target: RwLock::new(target_env),
            target_path: target.map(Path::to_path_buf),
        })
    }

    /// Number of entries and assets in the source export.
    pub fn source_counts(&self) -> (usize, usize) {
        (self.entries.len(), self.assets.len())
    }

    /// Writes the target environment back to its file.
    pub fn save(&self) -> Result<(), ExportError> {
        let Some(path) = &self.target_path else {
            return Ok(());
        };
        let export = self.target.read().to_export();
        let json = serde_json::to_string_pretty(&export).map_err(|source| ExportError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved target export");
        Ok(())
    }

    fn check_target(&self) -> ClientResult<()> {
        if self.target_path.is_none() {
            return Err(ClientError::NotConfigured {
                what: "target file".into(),
            });
        }
        Ok(())
    }
}

impl ContentClient for ExportClient {
    fn fetch_entry(&self, id: &str) -> ClientResult<Entry> {
        self.entries.get(id).cloned().ok_or(ClientError::NotFound {
            key: NodeKey::entry(id),
        })
    }

    fn fetch_asset(&self, id: &str) -> ClientResult<Asset> {
        self.assets.get(id).cloned().ok_or(ClientError::NotFound {
            key: NodeKey::asset(id),
        })
    }

    fn write_entry(&self, entry: &Entry) -> ClientResult<()> {
        self.check_target()?;
        let mut target = self.target.write();
        let mut stored = entry.clone();
        match target.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                stored.metadata.version = next_version(existing.metadata.version);
                *existing = stored;
            }
            None => {
                stored.metadata.version = next_version(None);
                target.entries.push(stored);
            }
        }
        Ok(())
    }

    fn write_asset(&self, asset: &Asset) -> ClientResult<()> {
        self.check_target()?;
        let mut target = self.target.write();
        let mut stored = asset.clone();
        match target.assets.iter_mut().find(|a| a.id == asset.id) {
            Some(existing) => {
                stored.metadata.version = next_version(existing.metadata.version);
                *existing = stored;
            }
            None => {
                stored.metadata.version = next_version(None);
                target.assets.push(stored);
            }
        }
        Ok(())
    }
}
