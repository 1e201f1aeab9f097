//! In-Memory Consent Repository
//!
//! Authoritative decision store keyed by `(visitor, site)`. A save replaces
//! whatever was stored for the pair, so concurrent writers converge to the
//! last write.

use async_trait::async_trait;
use dashmap::DashMap;

use cmp_domain::error::Result;
use cmp_domain::ports::ConsentRepository;
use cmp_domain::value_objects::{ConsentDecision, SiteId, VisitorId};

/// `DashMap`-backed [`ConsentRepository`]
#[derive(Debug, Default)]
pub struct InMemoryConsentRepository {
    decisions: DashMap<(VisitorId, SiteId), ConsentDecision>,
}

impl InMemoryConsentRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentRepository for InMemoryConsentRepository {
    async fn find(&self, visitor: &VisitorId, site: &SiteId) -> Result<Option<ConsentDecision>> {
        Ok(self
            .decisions
            .get(&(visitor.clone(), site.clone()))
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, decision: ConsentDecision) -> Result<()> {
        let key = (decision.visitor_id.clone(), decision.site_id.clone());
        self.decisions.insert(key, decision);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.decisions.len())
    }
}
