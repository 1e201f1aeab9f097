//! Submission Client Use Case
//!
//! Talks to the persistence service on behalf of the engine:
//!
//! - the existing-decision lookup, bounded by a timeout
//! - decision submission, guarded so at most one is in flight; concurrent
//!   submissions are dropped, never queued
//! - one retry with a reduced payload when the failure looks size-related,
//!   otherwise the decision is abandoned and the next page load re-prompts

use cmp_domain::ports::{ConsentPersistence, ConsentTokenEncoder, PageDocument};
use cmp_domain::value_objects::{
    BackendOperation, BannerInteraction, ClientMetadata, ConsentChoices, ConsentDecision,
    DecisionSet, InteractionType, SiteId, SubmissionPayload, VisitorId,
};
use cmp_domain::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of the existing-decision lookup
#[derive(Debug)]
pub enum ExistingDecision {
    /// The service returned a decision
    Found(ConsentDecision),
    /// No decision stored, or the reply was unusable
    NotFound,
    /// The lookup failed
    Failed(Error),
    /// The lookup did not finish within its budget
    TimedOut,
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Stored with the full payload
    Stored(ConsentDecision),
    /// Stored after the reduced-payload retry
    StoredReduced(ConsentDecision),
    /// Dropped because another submission was pending
    SkippedInFlight,
    /// Given up; the next page load will ask again
    Abandoned {
        /// Last error
        reason: String,
    },
}

impl SubmissionOutcome {
    /// Whether the service acknowledged the decision
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_) | Self::StoredReduced(_))
    }
}

/// A submission and the payload it sent
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    /// Full payload as built
    pub payload: SubmissionPayload,
    /// Outcome
    pub outcome: SubmissionOutcome,
}

/// Releases the in-flight flag once the submission has settled
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Client side of the persistence contract
pub struct SubmissionClient {
    persistence: Arc<dyn ConsentPersistence>,
    encoder: Arc<dyn ConsentTokenEncoder>,
    document: Arc<dyn PageDocument>,
    site: SiteId,
    visitor: VisitorId,
    in_flight: AtomicBool,
    shown_at: Mutex<Option<Instant>>,
}

impl SubmissionClient {
    /// Create a client for one visitor on one site
    pub fn new(
        persistence: Arc<dyn ConsentPersistence>,
        encoder: Arc<dyn ConsentTokenEncoder>,
        document: Arc<dyn PageDocument>,
        site: SiteId,
        visitor: VisitorId,
    ) -> Self {
        Self {
            persistence,
            encoder,
            document,
            site,
            visitor,
            in_flight: AtomicBool::new(false),
            shown_at: Mutex::new(None),
        }
    }

    /// Visitor this client submits for
    pub fn visitor_id(&self) -> &VisitorId {
        &self.visitor
    }

    /// Whether a submission is pending
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start the time-to-decision clock
    pub fn mark_banner_shown(&self) {
        *self.shown_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Look up the stored decision within `budget`
    pub async fn fetch_existing(&self, budget: Duration) -> ExistingDecision {
        let lookup = self.persistence.fetch_existing(&self.site, &self.visitor);
        match tokio::time::timeout(budget, lookup).await {
            Ok(Ok(Some(decision))) => ExistingDecision::Found(decision),
            Ok(Ok(None)) => ExistingDecision::NotFound,
            Ok(Err(Error::MalformedResponse { message })) => {
                debug!(%message, "Malformed existing-decision reply treated as none");
                ExistingDecision::NotFound
            }
            Ok(Err(e)) => ExistingDecision::Failed(e),
            Err(_) => ExistingDecision::TimedOut,
        }
    }

    /// Build the payload for a decision
    pub fn build_payload(
        &self,
        interaction: InteractionType,
        choices: ConsentChoices,
        vendor_list_version: u32,
        had_prior_decision: bool,
    ) -> SubmissionPayload {
        let choices = choices.normalized();
        let consent_token = match self.encoder.encode(&choices, vendor_list_version) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(
                    encoder = self.encoder.encoder_name(),
                    error = %e,
                    "Consent token encoding failed"
                );
                None
            }
        };
        let shown_at = *self.shown_at.lock().unwrap_or_else(PoisonError::into_inner);
        let time_to_decision =
            shown_at.map(|shown| u64::try_from(shown.elapsed().as_millis()).unwrap_or(u64::MAX));

        SubmissionPayload {
            visitor_id: self.visitor.clone(),
            decisions: DecisionSet::new(
                choices,
                consent_token,
                BackendOperation::for_interaction(interaction, had_prior_decision),
            ),
            banner_interaction: BannerInteraction {
                interaction_type: interaction,
                time_to_decision,
            },
            metadata: Some(ClientMetadata::new(
                self.document.user_agent(),
                self.document.language(),
            )),
        }
    }

    /// Build and submit a decision
    pub async fn submit(
        &self,
        interaction: InteractionType,
        choices: ConsentChoices,
        vendor_list_version: u32,
        had_prior_decision: bool,
    ) -> SubmissionReport {
        let payload =
            self.build_payload(interaction, choices, vendor_list_version, had_prior_decision);
        let outcome = self.submit_payload(&payload).await;
        SubmissionReport { payload, outcome }
    }

    /// Submit a prepared payload under the in-flight guard
    pub async fn submit_payload(&self, payload: &SubmissionPayload) -> SubmissionOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!(
                visitor_id = %self.visitor,
                error = %Error::ConcurrentSubmission,
                "Dropping submission"
            );
            return SubmissionOutcome::SkippedInFlight;
        };

        let error = match self.persistence.store(&self.site, payload).await {
            Ok(decision) => {
                info!(
                    visitor_id = %self.visitor,
                    site_id = %self.site,
                    interaction = %payload.banner_interaction.interaction_type,
                    "Decision stored"
                );
                return SubmissionOutcome::Stored(decision);
            }
            Err(e) => e,
        };

        if !error.is_size_related() {
            warn!(error = %error, "Submission failed; next page load will ask again");
            return SubmissionOutcome::Abandoned {
                reason: error.to_string(),
            };
        }

        warn!(error = %error, "Submission rejected as too large, retrying reduced payload");
        match self.persistence.store(&self.site, &payload.reduced()).await {
            Ok(decision) => SubmissionOutcome::StoredReduced(decision),
            Err(e) => {
                warn!(error = %e, "Reduced submission failed; giving up");
                SubmissionOutcome::Abandoned {
                    reason: e.to_string(),
                }
            }
        }
    }
}
