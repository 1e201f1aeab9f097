//! Visitor identifier storage configuration

use crate::constants::{DEFAULT_DURABLE_STORE, DEFAULT_LEGACY_STORE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage tiers resolved through the key-value store registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Durable tier provider name; `None` disables the tier
    pub durable: Option<String>,
    /// Backing file of the durable tier
    pub durable_path: Option<PathBuf>,
    /// Legacy tier provider name; `None` disables the tier
    pub legacy: Option<String>,
    /// Initial contents of the legacy tier, e.g. a cookie header
    pub legacy_initial: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            durable: Some(DEFAULT_DURABLE_STORE.to_string()),
            durable_path: None,
            legacy: Some(DEFAULT_LEGACY_STORE.to_string()),
            legacy_initial: None,
        }
    }
}
