//! Persistence service configuration

use crate::constants::{DEFAULT_CORS_ORIGIN, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};
use serde::{Deserialize, Serialize};

/// Where and how the persistence service listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Value of `Access-Control-Allow-Origin`
    pub cors_allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            cors_allowed_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}
