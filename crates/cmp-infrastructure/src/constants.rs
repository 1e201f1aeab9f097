//! Infrastructure constants

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Prefix of configuration environment variables (`CMP_SERVER__PORT`)
pub const CONFIG_ENV_PREFIX: &str = "CMP";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "cmp.toml";

/// Configuration directory name under the XDG config dir
pub const DEFAULT_CONFIG_DIR: &str = "cmp";

// ============================================================================
// SERVER CONSTANTS
// ============================================================================

/// Default bind address of the persistence service
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default port of the persistence service
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default `Access-Control-Allow-Origin` value
pub const DEFAULT_CORS_ORIGIN: &str = "*";

// ============================================================================
// CLIENT CONSTANTS
// ============================================================================

pub use cmp_providers::constants::{DEFAULT_PERSISTENCE_URL, DEFAULT_REQUEST_TIMEOUT_MS};

/// User agent sent by the persistence client
pub const HTTP_CLIENT_USER_AGENT: &str = concat!("cmp/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// STORAGE CONSTANTS
// ============================================================================

/// Default durable tier for the visitor identifier
pub const DEFAULT_DURABLE_STORE: &str = "file";

/// Default legacy tier for the visitor identifier
pub const DEFAULT_LEGACY_STORE: &str = "cookie";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "CMP_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name stem used when the configured log path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "cmp";
