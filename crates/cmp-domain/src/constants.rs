//! Domain layer constants
//!
//! Values fixed by the Transparency & Consent Framework or shared between
//! the embedded engine and the persistence service.

// ============================================================================
// TCF PROTOCOL CONSTANTS
// ============================================================================

/// API version reported by `ping`
pub const TCF_API_VERSION: &str = "2.2";

/// TCF policy version reported by `ping` and `getTCData`
pub const TCF_POLICY_VERSION: u8 = 2;

/// Highest command-API major version accepted by the stub (0 means "latest")
pub const TCF_MAX_COMMAND_VERSION: u32 = 2;

/// Name of the hidden frame that advertises the API to other frames
pub const TCF_LOCATOR_FRAME_NAME: &str = "__tcfapiLocator";

/// Envelope key of an inbound cross-frame call
pub const TCF_CALL_ENVELOPE_KEY: &str = "__tcfapiCall";

/// Envelope key of an outbound cross-frame reply
pub const TCF_RETURN_ENVELOPE_KEY: &str = "__tcfapiReturn";

// ============================================================================
// DECISION MODEL CONSTANTS
// ============================================================================

/// Purpose 1 (store and/or access information on a device) is always granted
pub const STRICTLY_NECESSARY_PURPOSE: u16 = 1;

/// Standard TCF v2.2 purpose catalog size
pub const TCF_STANDARD_PURPOSE_COUNT: u16 = 11;

// ============================================================================
// BANNER DOM CONSTANTS
// ============================================================================

/// Element id looked up before any heuristic scanning
pub const WELL_KNOWN_BANNER_ID: &str = "cmp-consent-banner";

/// Attribute naming the canonical action of a control
pub const ACTION_MARKER_ATTRIBUTE: &str = "data-cmp-action";

/// Attribute naming a panel inside the banner root
pub const PANEL_MARKER_ATTRIBUTE: &str = "data-cmp-panel";

/// Panel marker value of the preferences panel
pub const PREFERENCES_PANEL: &str = "preferences";

/// Attribute carrying the purpose id of a preference checkbox
pub const PURPOSE_MARKER_ATTRIBUTE: &str = "data-cmp-purpose";

/// Attribute carrying the vendor id of a preference checkbox
pub const VENDOR_MARKER_ATTRIBUTE: &str = "data-cmp-vendor";

/// Storage key holding the visitor identifier in every tier
pub const VISITOR_ID_STORAGE_KEY: &str = "cmp_visitor_id";

// ============================================================================
// ENGINE TIMING DEFAULTS
// ============================================================================

/// Budget for the existing-decision lookup before failing open
pub const EXISTING_DECISION_TIMEOUT_MS: u64 = 3_000;

/// Bounded number of discovery retries
pub const DISCOVERY_MAX_ATTEMPTS: u32 = 10;

/// Fixed delay between discovery retries
pub const DISCOVERY_RETRY_DELAY_MS: u64 = 200;

/// Hard wall-clock budget of the whole discovery phase
pub const DISCOVERY_WINDOW_MS: u64 = 3_000;

/// Window in which a second banner activation is ignored
pub const ACTION_DEBOUNCE_MS: u64 = 1_000;

/// Age after which a stored decision no longer suppresses the banner (about 13 months)
pub const DECISION_MAX_AGE_DAYS: u32 = 390;
