//! Engine settings value object

use super::identity::SiteId;
use crate::constants::{
    ACTION_DEBOUNCE_MS, DECISION_MAX_AGE_DAYS, DISCOVERY_MAX_ATTEMPTS, DISCOVERY_RETRY_DELAY_MS,
    DISCOVERY_WINDOW_MS, EXISTING_DECISION_TIMEOUT_MS, VISITOR_ID_STORAGE_KEY,
    WELL_KNOWN_BANNER_ID,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of one embedded engine instance
///
/// Durations are stored as milliseconds so the struct maps cleanly onto TOML
/// and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Site the engine collects consent for
    pub site_id: String,
    /// Registered CMP id
    pub cmp_id: u16,
    /// CMP build version
    pub cmp_version: u16,
    /// Vendor list version reported by `ping`
    pub gvl_version: u32,
    /// Whether GDPR applies to visitors of this site
    pub gdpr_applies: bool,
    /// Publisher country code
    pub publisher_cc: String,
    /// Budget for the existing-decision lookup
    pub existing_decision_timeout_ms: u64,
    /// Bounded number of discovery retries
    pub discovery_max_attempts: u32,
    /// Delay between discovery retries
    pub discovery_retry_delay_ms: u64,
    /// Hard budget of the discovery phase, mutation observation included
    pub discovery_window_ms: u64,
    /// Window in which repeated activations are ignored
    pub debounce_ms: u64,
    /// Maximum age of a decision that still suppresses the banner
    pub decision_max_age_days: u32,
    /// Well-known banner element id
    pub banner_element_id: String,
    /// Storage key of the visitor identifier
    pub visitor_storage_key: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            site_id: "default".to_string(),
            cmp_id: 0,
            cmp_version: 1,
            gvl_version: 1,
            gdpr_applies: true,
            publisher_cc: "EU".to_string(),
            existing_decision_timeout_ms: EXISTING_DECISION_TIMEOUT_MS,
            discovery_max_attempts: DISCOVERY_MAX_ATTEMPTS,
            discovery_retry_delay_ms: DISCOVERY_RETRY_DELAY_MS,
            discovery_window_ms: DISCOVERY_WINDOW_MS,
            debounce_ms: ACTION_DEBOUNCE_MS,
            decision_max_age_days: DECISION_MAX_AGE_DAYS,
            banner_element_id: WELL_KNOWN_BANNER_ID.to_string(),
            visitor_storage_key: VISITOR_ID_STORAGE_KEY.to_string(),
        }
    }
}

impl EngineSettings {
    /// Settings for the given site with every other value defaulted
    pub fn for_site(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            ..Self::default()
        }
    }

    /// Typed site id
    pub fn site(&self) -> SiteId {
        SiteId::new(self.site_id.clone())
    }

    /// Existing-decision lookup budget
    pub fn existing_decision_timeout(&self) -> Duration {
        Duration::from_millis(self.existing_decision_timeout_ms)
    }

    /// Delay between discovery retries
    pub fn discovery_retry_delay(&self) -> Duration {
        Duration::from_millis(self.discovery_retry_delay_ms)
    }

    /// Hard discovery budget
    pub fn discovery_window(&self) -> Duration {
        Duration::from_millis(self.discovery_window_ms)
    }

    /// Activation debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
