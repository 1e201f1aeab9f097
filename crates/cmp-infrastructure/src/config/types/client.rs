//! Persistence client configuration

use crate::constants::{DEFAULT_PERSISTENCE_URL, DEFAULT_REQUEST_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How the engine reaches the persistence service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL; `/consent/{siteId}` is appended
    pub base_url: String,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Vendor list JSON file; the standard purposes are used when unset
    pub vendor_list_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PERSISTENCE_URL.to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            vendor_list_path: None,
        }
    }
}
