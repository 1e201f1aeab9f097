//! Root configuration

use super::{ClientConfig, LoggingConfig, ServerConfig, StorageConfig};
use cmp_domain::value_objects::EngineSettings;
use serde::{Deserialize, Serialize};

/// Complete configuration of the binary and the persistence service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Persistence service
    pub server: ServerConfig,
    /// Persistence client used by the engine
    pub client: ClientConfig,
    /// Embedded engine settings
    pub engine: EngineSettings,
    /// Visitor identifier tiers
    pub storage: StorageConfig,
    /// Logging
    pub logging: LoggingConfig,
}
