//! JSON file key-value store
//!
//! Durable tier backed by a single JSON object on disk. Every read goes to
//! the file so several processes sharing it observe each other's writes.

use crate::constants::{DEFAULT_STORE_DIR, DEFAULT_STORE_FILE};
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const TIER_NAME: &str = "file";

/// File-backed store
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store in the user's data directory
    pub fn in_data_dir() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| Error::storage_unavailable(TIER_NAME, "no data directory"))?;
        Ok(Self::new(base.join(DEFAULT_STORE_DIR).join(DEFAULT_STORE_FILE)))
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(Error::storage_unavailable(TIER_NAME, e.to_string())),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::storage_unavailable(
                TIER_NAME,
                format!("corrupt store {}: {e}", self.path.display()),
            )
        })
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        apply(&mut entries);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::storage_unavailable(TIER_NAME, e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::storage_unavailable(TIER_NAME, e.to_string()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn tier_name(&self) -> &str {
        TIER_NAME
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use cmp_application::registry::{KEY_VALUE_STORES, StorageProviderConfig, StorageProviderEntry};
use std::sync::Arc;

fn file_factory(
    config: &StorageProviderConfig,
) -> std::result::Result<Arc<dyn KeyValueStore>, String> {
    let store = match &config.path {
        Some(path) => FileKeyValueStore::new(path),
        None => FileKeyValueStore::in_data_dir().map_err(|e| e.to_string())?,
    };
    Ok(Arc::new(store))
}

#[linkme::distributed_slice(KEY_VALUE_STORES)]
static FILE_STORE: StorageProviderEntry = StorageProviderEntry {
    name: "file",
    description: "JSON file store (durable)",
    factory: file_factory,
};
