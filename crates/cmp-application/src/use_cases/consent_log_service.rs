//! Consent Log Service Use Case
//!
//! Server half of the persistence contract. Exactly one decision is kept
//! per `(visitor, site)`; every write replaces the previous one, so a
//! retried submission converges to the same stored state.

use crate::ports::services::ConsentLogServiceInterface;
use async_trait::async_trait;
use cmp_domain::constants::STRICTLY_NECESSARY_PURPOSE;
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::{ConsentRepository, ConsentTokenEncoder};
use cmp_domain::value_objects::{ConsentDecision, SiteId, SubmissionPayload, VisitorId};
use std::sync::Arc;
use tracing::{debug, info};

/// Consent logging backed by a [`ConsentRepository`]
pub struct ConsentLogService {
    repository: Arc<dyn ConsentRepository>,
    encoder: Arc<dyn ConsentTokenEncoder>,
    vendor_list_version: u32,
}

impl ConsentLogService {
    /// Create the service
    ///
    /// `vendor_list_version` is used when a token has to be derived
    /// server-side.
    pub fn new(
        repository: Arc<dyn ConsentRepository>,
        encoder: Arc<dyn ConsentTokenEncoder>,
        vendor_list_version: u32,
    ) -> Self {
        Self {
            repository,
            encoder,
            vendor_list_version,
        }
    }
}

fn validate(site: &SiteId, payload: &SubmissionPayload) -> Result<()> {
    if site.is_empty() {
        return Err(Error::invalid_argument("siteId is required"));
    }
    if payload.visitor_id.is_empty() {
        return Err(Error::invalid_argument("visitorId is required"));
    }
    if payload.decisions.purposes.contains_key(&0) {
        return Err(Error::invalid_argument("purpose ids start at 1"));
    }
    Ok(())
}

#[async_trait]
impl ConsentLogServiceInterface for ConsentLogService {
    async fn record(&self, site: &SiteId, payload: SubmissionPayload) -> Result<ConsentDecision> {
        validate(site, &payload)?;

        let choices = payload.decisions.choices().normalized();
        if payload.decisions.purposes.get(&STRICTLY_NECESSARY_PURPOSE) != Some(&true) {
            debug!(visitor_id = %payload.visitor_id, "Forcing strictly necessary purpose");
        }

        let consent_token = match payload.decisions.consent_token {
            Some(token) if !token.is_empty() => token,
            _ => self.encoder.encode(&choices, self.vendor_list_version)?,
        };

        let decision = ConsentDecision::new(
            payload.visitor_id,
            site.clone(),
            choices,
            Some(consent_token),
            payload.banner_interaction.interaction_type,
        );
        self.repository.save(decision.clone()).await?;

        info!(
            visitor_id = %decision.visitor_id,
            site_id = %site,
            interaction = %decision.interaction_type,
            operation = ?payload.decisions.operation,
            "Consent decision recorded"
        );
        Ok(decision)
    }

    async fn lookup(&self, site: &SiteId, visitor: &VisitorId) -> Result<Option<ConsentDecision>> {
        if visitor.is_empty() {
            return Err(Error::invalid_argument("visitorId is required"));
        }
        self.repository.find(visitor, site).await
    }

    async fn stored_decisions(&self) -> Result<usize> {
        self.repository.count().await
    }
}
