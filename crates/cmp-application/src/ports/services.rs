//! Application Service Interfaces

use async_trait::async_trait;
use cmp_domain::error::Result;
use cmp_domain::value_objects::{ConsentDecision, SiteId, SubmissionPayload, VisitorId};

/// Server-side consent logging operations
#[async_trait]
pub trait ConsentLogServiceInterface: Send + Sync {
    /// Record a submitted decision, replacing any earlier one
    async fn record(&self, site: &SiteId, payload: SubmissionPayload) -> Result<ConsentDecision>;

    /// Latest decision for `(visitor, site)`
    async fn lookup(&self, site: &SiteId, visitor: &VisitorId) -> Result<Option<ConsentDecision>>;

    /// Number of stored decisions
    async fn stored_decisions(&self) -> Result<usize>;
}
