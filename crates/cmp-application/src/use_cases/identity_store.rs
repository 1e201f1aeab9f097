//! Identity Store Use Case
//!
//! Obtains the durable anonymous visitor identifier.
//!
//! Tier precedence:
//! 1. durable key-value store
//! 2. legacy cookie-style store, read only to migrate an old identifier
//!    forward into tier 1
//! 3. in-memory fallback when neither tier works (non-durable, degraded)
//!
//! Storage failures never reach the caller; they are logged and the next
//! tier is tried.

use cmp_domain::ports::KeyValueStore;
use cmp_domain::value_objects::VisitorId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Where the returned identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Already cached by this store instance
    Session,
    /// Read from the durable tier
    Durable,
    /// Read from the legacy tier and copied forward
    MigratedFromLegacy,
    /// Freshly generated and persisted in the durable tier
    Generated,
    /// Generated or migrated but only held in memory
    Memory,
}

/// Visitor identity resolution over the storage tiers
pub struct IdentityStore {
    key: String,
    durable: Option<Arc<dyn KeyValueStore>>,
    legacy: Option<Arc<dyn KeyValueStore>>,
    session: Mutex<Option<VisitorId>>,
    degraded: AtomicBool,
}

impl IdentityStore {
    /// Create a store reading `key` from the given tiers
    pub fn new(
        key: impl Into<String>,
        durable: Option<Arc<dyn KeyValueStore>>,
        legacy: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        Self {
            key: key.into(),
            durable,
            legacy,
            session: Mutex::new(None),
            degraded: AtomicBool::new(false),
        }
    }

    /// Return the visitor id, creating it on first use
    pub fn get_or_create_visitor_id(&self) -> VisitorId {
        self.resolve().0
    }

    /// Whether the identifier only lives in memory
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Resolve the identifier and report which tier produced it
    pub fn resolve(&self) -> (VisitorId, IdentitySource) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = session.as_ref() {
            return (existing.clone(), IdentitySource::Session);
        }

        let (visitor, source) = self.resolve_from_tiers();
        debug!(visitor_id = %visitor, ?source, "Visitor identity resolved");
        *session = Some(visitor.clone());
        (visitor, source)
    }

    fn resolve_from_tiers(&self) -> (VisitorId, IdentitySource) {
        let mut durable_usable = self.durable.is_some();

        if let Some(value) = self.durable.as_deref().and_then(|tier| {
            read_tier(tier, &self.key).unwrap_or_else(|| {
                durable_usable = false;
                None
            })
        }) {
            return (value, IdentitySource::Durable);
        }

        if let Some(value) = self
            .legacy
            .as_deref()
            .and_then(|tier| read_tier(tier, &self.key).flatten())
        {
            if durable_usable && self.persist(&value) {
                info!(visitor_id = %value, "Migrated visitor id from legacy storage");
                return (value, IdentitySource::MigratedFromLegacy);
            }
            self.enter_degraded_mode();
            return (value, IdentitySource::Memory);
        }

        let generated = VisitorId::generate();
        if durable_usable && self.persist(&generated) {
            return (generated, IdentitySource::Generated);
        }
        self.enter_degraded_mode();
        (generated, IdentitySource::Memory)
    }

    fn persist(&self, visitor: &VisitorId) -> bool {
        let Some(tier) = self.durable.as_deref() else {
            return false;
        };
        match tier.set(&self.key, visitor.as_str()) {
            Ok(()) => true,
            Err(e) => {
                warn!(tier = tier.tier_name(), error = %e, "Failed to persist visitor id");
                false
            }
        }
    }

    fn enter_degraded_mode(&self) {
        self.degraded.store(true, Ordering::Release);
        warn!("No durable storage available, visitor id kept in memory only");
    }
}

/// Read one tier; the outer `None` means the tier itself failed
fn read_tier(tier: &dyn KeyValueStore, key: &str) -> Option<Option<VisitorId>> {
    match tier.get(key) {
        Ok(value) => Some(
            value
                .map(VisitorId::new)
                .filter(|visitor| !visitor.is_empty()),
        ),
        Err(e) => {
            warn!(tier = tier.tier_name(), error = %e, "Storage tier unavailable");
            None
        }
    }
}
