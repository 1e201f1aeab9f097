//! In-Process Consent Persistence
//!
//! Serves the client side of the persistence contract straight from a
//! consent log service, without HTTP. Used by `simulate --offline` and by
//! tests, which can also inject latency, failures and a body size limit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use cmp_application::ports::ConsentLogServiceInterface;
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::ConsentPersistence;
use cmp_domain::value_objects::{ConsentDecision, SiteId, SubmissionPayload, VisitorId};

/// [`ConsentPersistence`] backed by an in-process consent log service
pub struct LocalConsentPersistence {
    service: Arc<dyn ConsentLogServiceInterface>,
    lookup_delay: Mutex<Duration>,
    store_delay: Mutex<Duration>,
    max_payload_bytes: Option<usize>,
    lookup_failing: AtomicBool,
    store_failing: AtomicBool,
    store_attempts: AtomicUsize,
    stored_writes: AtomicUsize,
}

impl LocalConsentPersistence {
    /// Wrap a consent log service
    pub fn new(service: Arc<dyn ConsentLogServiceInterface>) -> Self {
        Self {
            service,
            lookup_delay: Mutex::new(Duration::ZERO),
            store_delay: Mutex::new(Duration::ZERO),
            max_payload_bytes: None,
            lookup_failing: AtomicBool::new(false),
            store_failing: AtomicBool::new(false),
            store_attempts: AtomicUsize::new(0),
            stored_writes: AtomicUsize::new(0),
        }
    }

    /// Reject bodies larger than `bytes` as [`Error::PayloadTooLarge`]
    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = Some(bytes);
        self
    }

    /// Delay every lookup
    pub fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Delay every store
    pub fn set_store_delay(&self, delay: Duration) {
        *self.store_delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Make lookups fail with a network error
    pub fn set_lookup_failing(&self, failing: bool) {
        self.lookup_failing.store(failing, Ordering::SeqCst);
    }

    /// Make stores fail with a network error
    pub fn set_store_failing(&self, failing: bool) {
        self.store_failing.store(failing, Ordering::SeqCst);
    }

    /// Number of store calls received
    pub fn store_attempts(&self) -> usize {
        self.store_attempts.load(Ordering::SeqCst)
    }

    /// Number of decisions actually written
    pub fn stored_writes(&self) -> usize {
        self.stored_writes.load(Ordering::SeqCst)
    }

    /// The wrapped service
    pub fn service(&self) -> &Arc<dyn ConsentLogServiceInterface> {
        &self.service
    }

    fn delay(delay: &Mutex<Duration>) -> Duration {
        *delay.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConsentPersistence for LocalConsentPersistence {
    async fn fetch_existing(
        &self,
        site: &SiteId,
        visitor: &VisitorId,
    ) -> Result<Option<ConsentDecision>> {
        let delay = Self::delay(&self.lookup_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.lookup_failing.load(Ordering::SeqCst) {
            return Err(Error::network("persistence service unreachable"));
        }
        self.service.lookup(site, visitor).await
    }

    async fn store(&self, site: &SiteId, payload: &SubmissionPayload) -> Result<ConsentDecision> {
        self.store_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = Self::delay(&self.store_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.store_failing.load(Ordering::SeqCst) {
            return Err(Error::network("persistence service unreachable"));
        }
        if let Some(limit) = self.max_payload_bytes {
            let size = serde_json::to_vec(payload)?.len();
            if size > limit {
                debug!(size, limit, "Rejecting oversized payload");
                return Err(Error::PayloadTooLarge { size });
            }
        }
        let decision = self.service.record(site, payload.clone()).await?;
        self.stored_writes.fetch_add(1, Ordering::SeqCst);
        Ok(decision)
    }
}
