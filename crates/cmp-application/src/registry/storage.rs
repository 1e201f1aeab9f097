//! Key-Value Storage Provider Registry
//!
//! Storage tiers for the visitor identifier register themselves here and
//! are selected by name from configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use cmp_domain::ports::KeyValueStore;

/// Configuration for storage provider creation
///
/// Providers use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct StorageProviderConfig {
    /// Provider name (e.g., "memory", "file", "cookie")
    pub provider: String,
    /// Backing file for file-based tiers
    pub path: Option<PathBuf>,
    /// Initial raw contents (e.g., a cookie header)
    pub initial: Option<String>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl StorageProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the backing file
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the initial contents
    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for storage providers
pub struct StorageProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the store
    pub factory: fn(&StorageProviderConfig) -> Result<Arc<dyn KeyValueStore>, String>,
}

#[linkme::distributed_slice]
pub static KEY_VALUE_STORES: [StorageProviderEntry] = [..];

/// Resolve a storage provider by name from the registry
///
/// # Returns
/// * `Ok(Arc<dyn KeyValueStore>)` - Created store
/// * `Err(String)` - Unknown provider or factory failure
pub fn resolve_storage_provider(
    config: &StorageProviderConfig,
) -> Result<Arc<dyn KeyValueStore>, String> {
    if let Some(entry) = KEY_VALUE_STORES
        .iter()
        .find(|entry| entry.name == config.provider)
    {
        return (entry.factory)(config);
    }

    let available: Vec<&str> = KEY_VALUE_STORES.iter().map(|e| e.name).collect();
    Err(format!(
        "Unknown storage provider '{}'. Available providers: {:?}",
        config.provider, available
    ))
}

/// List all registered storage providers as (name, description)
pub fn list_storage_providers() -> Vec<(&'static str, &'static str)> {
    KEY_VALUE_STORES
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
