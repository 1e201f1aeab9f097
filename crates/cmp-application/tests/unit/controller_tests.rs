//! Tests for the banner lifecycle, driven through the engine

use std::time::Duration;

use chrono::Utc;
use cmp_application::engine::ConsentEngine;
use cmp_application::use_cases::SubmissionOutcome;
use cmp_domain::ports::{ConsentRepository, PageDocument};
use cmp_domain::value_objects::{
    BannerAction, BannerState, ConsentChoices, ConsentDecision, DisplayStatus, EngineSettings,
    EventStatus, InteractionType, SiteId, VisitorId,
};
use cmp_providers::document::VirtualDocument;

use crate::support::{Fixture, SITE, VISITOR, catalog, settings, standard_banner};

fn fixture_with_banner() -> (Fixture, crate::support::BannerPage) {
    let doc = VirtualDocument::new();
    let page = standard_banner(&doc);
    (Fixture::with_document(doc), page)
}

async fn stored(fixture: &Fixture) -> Option<ConsentDecision> {
    fixture
        .repository
        .find(&VisitorId::new(VISITOR), &SiteId::new(SITE))
        .await
        .expect("find")
}

#[tokio::test]
async fn test_new_visitor_sees_banner() {
    let (fixture, page) = fixture_with_banner();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");

    assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);
    assert!(fixture.doc.is_visible(page.root));
    assert_eq!(engine.controller().banner_root(), Some(page.root));
    assert_eq!(engine.stub().event_status(), Some(EventStatus::CmpUiShown));
    assert_eq!(engine.stub().ping().display_status, DisplayStatus::Visible);
    assert_eq!(
        engine.controller().history(),
        vec![
            BannerState::Idle,
            BannerState::AwaitingExistingDecision,
            BannerState::Searching,
            BannerState::Bound,
            BannerState::AwaitingUserChoice,
        ]
    );
}

#[tokio::test]
async fn test_accept_all_hides_banner_and_stores_every_purpose() {
    let (fixture, page) = fixture_with_banner();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    engine.run().await;

    assert_eq!(fixture.doc.click(page.accept), 1);
    // Hidden before the service has answered
    assert!(!fixture.doc.is_visible(page.root));
    assert_eq!(engine.controller().state(), BannerState::Submitting);

    let outcome = engine.controller().wait_for_submission().await;
    assert!(matches!(outcome, Some(SubmissionOutcome::Stored(_))));
    assert_eq!(engine.controller().state(), BannerState::Suppressed);
    assert_eq!(
        engine.stub().event_status(),
        Some(EventStatus::UserActionComplete)
    );

    let decision = stored(&fixture).await.expect("stored decision");
    assert_eq!(decision.interaction_type, InteractionType::AcceptAll);
    assert_eq!(decision.purposes.len(), 11);
    assert!(decision.purposes.values().all(|granted| *granted));
    assert_eq!(decision.vendors.get(&755), Some(&true));
}

#[tokio::test]
async fn test_reject_all_keeps_only_strictly_necessary() {
    let (fixture, page) = fixture_with_banner();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    engine.run().await;

    fixture.doc.click(page.reject);
    engine.controller().wait_for_submission().await;

    let decision = stored(&fixture).await.expect("stored decision");
    assert_eq!(decision.interaction_type, InteractionType::RejectAll);
    assert_eq!(decision.purposes.get(&1), Some(&true));
    assert_eq!(decision.purposes.values().filter(|granted| **granted).count(), 1);
    assert_eq!(decision.vendors.get(&755), Some(&false));
}

#[tokio::test]
async fn test_double_click_submits_once() {
    let (fixture, page) = fixture_with_banner();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    engine.run().await;

    fixture.doc.click(page.accept);
    fixture.doc.click(page.accept);
    fixture.doc.click(page.reject);
    engine.controller().wait_for_submission().await;

    assert_eq!(fixture.persistence.store_attempts(), 1);
    assert_eq!(fixture.persistence.stored_writes(), 1);
    let decision = stored(&fixture).await.expect("stored decision");
    assert_eq!(decision.interaction_type, InteractionType::AcceptAll);
}

#[test]
fn test_activation_inside_debounce_window_is_ignored() {
    let (fixture, page) = fixture_with_banner();
    let settings = EngineSettings {
        debounce_ms: 300,
        ..settings()
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let engine = runtime.block_on(async {
        let engine = ConsentEngine::initialize(fixture.deps_with(settings)).expect("engine");
        assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);
        engine
    });

    // Without a runtime the click cannot submit, so the banner stays up
    assert_eq!(fixture.doc.click(page.accept), 1);
    assert_eq!(engine.controller().state(), BannerState::AwaitingUserChoice);
    assert!(fixture.doc.is_visible(page.root));
    assert_eq!(engine.stub().event_status(), Some(EventStatus::CmpUiShown));

    runtime.block_on(async {
        // Still awaiting a choice, but inside the window of the first click
        engine.controller().activate(BannerAction::RejectAll);
        assert_eq!(engine.controller().state(), BannerState::AwaitingUserChoice);
        assert!(engine.controller().wait_for_submission().await.is_none());

        tokio::time::sleep(Duration::from_millis(400)).await;
        engine.controller().activate(BannerAction::RejectAll);
        assert_eq!(engine.controller().state(), BannerState::Submitting);
        let outcome = engine.controller().wait_for_submission().await;
        assert!(matches!(outcome, Some(SubmissionOutcome::Stored(_))));
    });

    assert_eq!(fixture.persistence.store_attempts(), 1);
    assert!(!fixture.doc.is_visible(page.root));
    assert_eq!(engine.controller().state(), BannerState::Suppressed);
}

#[tokio::test]
async fn test_preferences_panel_and_save() {
    let (fixture, page) = fixture_with_banner();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    engine.run().await;

    assert!(!fixture.doc.is_visible(page.panel));
    fixture.doc.click(page.settings);
    assert!(fixture.doc.is_visible(page.panel));
    assert_eq!(engine.controller().state(), BannerState::AwaitingUserChoice);

    fixture.doc.set_checked(page.purpose_2, true).expect("check");
    fixture.doc.set_checked(page.vendor_755, true).expect("check");
    fixture.doc.click(page.save);
    engine.controller().wait_for_submission().await;

    let decision = stored(&fixture).await.expect("stored decision");
    assert_eq!(decision.interaction_type, InteractionType::SavePreferences);
    assert_eq!(decision.purposes.get(&1), Some(&true));
    assert_eq!(decision.purposes.get(&2), Some(&true));
    assert_eq!(decision.purposes.get(&3), Some(&false));
    assert_eq!(decision.vendors.get(&755), Some(&true));
}

#[tokio::test]
async fn test_valid_decision_suppresses_banner() {
    let (fixture, page) = fixture_with_banner();
    fixture
        .repository
        .save(ConsentDecision::new(
            VisitorId::new(VISITOR),
            SiteId::new(SITE),
            ConsentChoices::accept_all(&catalog()),
            Some("cmp1.token".to_string()),
            InteractionType::AcceptAll,
        ))
        .await
        .expect("save");

    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    assert_eq!(engine.run().await, BannerState::Suppressed);

    assert!(!fixture.doc.is_visible(page.root));
    assert_eq!(engine.controller().banner_root(), None);
    assert_eq!(engine.stub().event_status(), Some(EventStatus::TcLoaded));
    assert_eq!(engine.stub().ping().display_status, DisplayStatus::Disabled);
    assert_eq!(fixture.doc.listener_count(page.accept), 0);
}

#[tokio::test]
async fn test_expired_decision_shows_banner_again() {
    let (fixture, page) = fixture_with_banner();
    let mut decision = ConsentDecision::new(
        VisitorId::new(VISITOR),
        SiteId::new(SITE),
        ConsentChoices::accept_all(&catalog()),
        None,
        InteractionType::AcceptAll,
    );
    decision.created_at = Utc::now() - chrono::Duration::days(400);
    fixture.repository.save(decision).await.expect("save");

    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);
    assert!(fixture.doc.is_visible(page.root));
}

#[tokio::test(start_paused = true)]
async fn test_slow_lookup_fails_open() {
    let (fixture, page) = fixture_with_banner();
    fixture.persistence.set_lookup_delay(Duration::from_secs(10));

    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);
    assert!(fixture.doc.is_visible(page.root));
}

#[tokio::test]
async fn test_degraded_identity_with_failed_lookup_still_shows_banner() {
    let (fixture, page) = fixture_with_banner();
    fixture.persistence.set_lookup_failing(true);
    let mut deps = fixture.deps();
    deps.durable_store = None;

    let engine = ConsentEngine::initialize(deps).expect("engine");
    assert!(engine.identity_degraded());
    assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);
    assert!(fixture.doc.is_visible(page.root));

    let history = engine.controller().history();
    let failed = history
        .iter()
        .position(|state| *state == BannerState::Failed)
        .expect("failed state recorded");
    assert_eq!(history[failed + 1], BannerState::Searching);
}

#[tokio::test]
async fn test_failed_submission_is_abandoned() {
    let (fixture, page) = fixture_with_banner();
    fixture.persistence.set_store_failing(true);
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    engine.run().await;

    fixture.doc.click(page.accept);
    let outcome = engine.controller().wait_for_submission().await;

    assert!(matches!(outcome, Some(SubmissionOutcome::Abandoned { .. })));
    assert!(stored(&fixture).await.is_none());
    assert!(!fixture.doc.is_visible(page.root));
}

#[tokio::test(start_paused = true)]
async fn test_fallback_banner_accepts() {
    let fixture = Fixture::new();
    let engine = ConsentEngine::initialize(fixture.deps()).expect("engine");
    assert_eq!(engine.run().await, BannerState::AwaitingUserChoice);

    let root = engine.controller().banner_root().expect("fallback bound");
    assert!(fixture.doc.is_visible(root));
    let accept = fixture
        .doc
        .descendants(root)
        .into_iter()
        .find(|element| element.attribute("data-cmp-action") == Some("accept_all"))
        .expect("accept control");
    fixture.doc.click(accept.handle);
    engine.controller().wait_for_submission().await;

    assert_eq!(fixture.persistence.stored_writes(), 1);
}
