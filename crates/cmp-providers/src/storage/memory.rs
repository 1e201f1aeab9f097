//! In-memory key-value store
//!
//! Non-durable. Can be switched into a failing mode to simulate a blocked
//! or full storage tier.

use cmp_domain::error::{Error, Result};
use cmp_domain::ports::KeyValueStore;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// `DashMap`-backed store
#[derive(Debug)]
pub struct InMemoryKeyValueStore {
    name: String,
    entries: DashMap<String, String>,
    failing: AtomicBool,
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::named("memory")
    }
}

impl InMemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store reporting `name` as its tier
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            failing: AtomicBool::new(false),
        }
    }

    /// Seed an entry
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Make every operation fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Raw read that ignores the failing flag
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(Error::storage_unavailable(&self.name, "storage disabled"));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.peek(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }

    fn tier_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use cmp_application::registry::{KEY_VALUE_STORES, StorageProviderConfig, StorageProviderEntry};
use std::sync::Arc;

fn memory_factory(
    _config: &StorageProviderConfig,
) -> std::result::Result<Arc<dyn KeyValueStore>, String> {
    Ok(Arc::new(InMemoryKeyValueStore::new()))
}

#[linkme::distributed_slice(KEY_VALUE_STORES)]
static MEMORY_STORE: StorageProviderEntry = StorageProviderEntry {
    name: "memory",
    description: "In-memory store (non-durable)",
    factory: memory_factory,
};
