//! Decision Persistence Ports
//!
//! Two views of the same contract: the embedded engine talks to the
//! persistence service through [`ConsentPersistence`]; the service stores
//! decisions through [`ConsentRepository`].

use crate::error::Result;
use crate::value_objects::{ConsentDecision, SiteId, SubmissionPayload, VisitorId};
use async_trait::async_trait;

/// Client view of the persistence service
#[async_trait]
pub trait ConsentPersistence: Send + Sync {
    /// Latest decision for `(visitor, site)`, or `None`
    ///
    /// A response that cannot be understood must be reported as
    /// [`crate::Error::MalformedResponse`].
    async fn fetch_existing(
        &self,
        site: &SiteId,
        visitor: &VisitorId,
    ) -> Result<Option<ConsentDecision>>;

    /// Store a decision; the service overwrites any earlier one
    async fn store(&self, site: &SiteId, payload: &SubmissionPayload) -> Result<ConsentDecision>;
}

/// Server-side authoritative decision store
///
/// Exactly one decision per `(visitor, site)`; saving replaces it.
#[async_trait]
pub trait ConsentRepository: Send + Sync {
    /// Load the decision for `(visitor, site)`
    async fn find(&self, visitor: &VisitorId, site: &SiteId) -> Result<Option<ConsentDecision>>;

    /// Replace the decision for the decision's `(visitor, site)`
    async fn save(&self, decision: ConsentDecision) -> Result<()>;

    /// Number of stored decisions
    async fn count(&self) -> Result<usize>;
}
