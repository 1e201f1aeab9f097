//! Tests for the persistence providers

use std::collections::BTreeMap;
use std::sync::Arc;

use cmp_application::use_cases::ConsentLogService;
use cmp_domain::error::Error;
use cmp_domain::value_objects::{
    BackendOperation, BannerInteraction, ConsentChoices, DecisionSet, InteractionType, SiteId,
    SubmissionPayload, VisitorId,
};
use cmp_providers::persistence::{InMemoryConsentRepository, LocalConsentPersistence};
use cmp_providers::token::CompactTokenEncoder;
use cmp_providers::{ConsentPersistence, ConsentRepository};

// ============================================================================
// Test Helpers
// ============================================================================

fn payload(visitor: &str, purposes: &[(u16, bool)]) -> SubmissionPayload {
    SubmissionPayload {
        visitor_id: VisitorId::new(visitor),
        decisions: DecisionSet::new(
            ConsentChoices::new(purposes.iter().copied().collect(), BTreeMap::new()),
            None,
            BackendOperation::Grant,
        ),
        banner_interaction: BannerInteraction {
            interaction_type: InteractionType::SavePreferences,
            time_to_decision: Some(1500),
        },
        metadata: None,
    }
}

fn local() -> (LocalConsentPersistence, Arc<InMemoryConsentRepository>) {
    let repository = Arc::new(InMemoryConsentRepository::new());
    let service = ConsentLogService::new(
        Arc::clone(&repository) as Arc<dyn ConsentRepository>,
        Arc::new(CompactTokenEncoder::new()),
        1,
    );
    (LocalConsentPersistence::new(Arc::new(service)), repository)
}

// ============================================================================
// Repository
// ============================================================================

#[tokio::test]
async fn test_repository_last_write_wins() {
    let (persistence, repository) = local();
    let site = SiteId::new("site-1");

    persistence
        .store(&site, &payload("v1", &[(2, true)]))
        .await
        .expect("first store");
    persistence
        .store(&site, &payload("v1", &[(2, false), (3, true)]))
        .await
        .expect("second store");

    assert_eq!(repository.count().await.expect("count"), 1);
    let stored = repository
        .find(&VisitorId::new("v1"), &site)
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(stored.purposes, BTreeMap::from([(1, true), (2, false), (3, true)]));
}

#[tokio::test]
async fn test_local_roundtrip_forces_purpose_one() {
    let (persistence, _) = local();
    let site = SiteId::new("site-1");
    let visitor = VisitorId::new("v1");

    assert!(persistence.fetch_existing(&site, &visitor).await.expect("lookup").is_none());

    let stored = persistence
        .store(&site, &payload("v1", &[(1, false), (2, true)]))
        .await
        .expect("store");
    assert_eq!(stored.purposes.get(&1), Some(&true));
    assert!(stored.consent_token.is_some());

    let fetched = persistence
        .fetch_existing(&site, &visitor)
        .await
        .expect("lookup")
        .expect("found");
    assert_eq!(fetched, stored);

    let other_site = SiteId::new("site-2");
    assert!(persistence.fetch_existing(&other_site, &visitor).await.expect("lookup").is_none());
}

#[tokio::test]
async fn test_local_payload_limit_and_failures() {
    let (persistence, _) = local();
    let persistence = persistence.with_max_payload_bytes(16);
    let site = SiteId::new("site-1");

    let err = persistence
        .store(&site, &payload("v1", &[(2, true)]))
        .await
        .expect_err("too large");
    assert!(matches!(err, Error::PayloadTooLarge { .. }));
    assert!(err.is_size_related());
    assert_eq!(persistence.store_attempts(), 1);
    assert_eq!(persistence.stored_writes(), 0);

    persistence.set_lookup_failing(true);
    let err = persistence
        .fetch_existing(&site, &VisitorId::new("v1"))
        .await
        .expect_err("failing lookup");
    assert!(matches!(err, Error::Network { .. }));
}

#[tokio::test]
async fn test_service_rejects_invalid_payloads() {
    let (persistence, _) = local();
    let err = persistence
        .store(&SiteId::new(""), &payload("v1", &[]))
        .await
        .expect_err("empty site");
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = persistence
        .store(&SiteId::new("site-1"), &payload(" ", &[]))
        .await
        .expect_err("empty visitor");
    assert!(matches!(err, Error::InvalidArgument { .. }));
}
