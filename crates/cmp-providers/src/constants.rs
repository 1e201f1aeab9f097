//! Provider Constants
//!
//! Constants specific to provider implementations. Protocol constants live
//! in `cmp_domain::constants`.

// ============================================================================
// STORAGE CONSTANTS
// ============================================================================

/// Directory under the user's data dir holding the file store
pub const DEFAULT_STORE_DIR: &str = "cmp";

/// File name of the default file store
pub const DEFAULT_STORE_FILE: &str = "storage.json";

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// JSON content type
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Path segment of the consent endpoints
pub const CONSENT_PATH: &str = "consent";

/// `status` of a successful response envelope
pub const ENVELOPE_SUCCESS: &str = "success";

/// `status` of a failed response envelope
pub const ENVELOPE_ERROR: &str = "error";

/// Query parameter carrying the visitor id
pub const VISITOR_QUERY_PARAM: &str = "visitorId";

/// Error message prefix for request timeouts
pub const ERROR_MSG_REQUEST_TIMEOUT: &str = "Request timed out after";

/// Default persistence service URL
pub const DEFAULT_PERSISTENCE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout of the persistence client, in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// DOCUMENT CONSTANTS
// ============================================================================

/// Default user agent of the virtual document
pub const VIRTUAL_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) cmp-virtual-document";

/// Default language of the virtual document
pub const VIRTUAL_LANGUAGE: &str = "en-US";

// ============================================================================
// TOKEN CONSTANTS
// ============================================================================

/// Prefix marking tokens produced by the compact encoder
pub const COMPACT_TOKEN_PREFIX: &str = "cmp1.";
