//! Simulation Tests
//!
//! Runs the engine end to end against the in-process consent service.

use std::sync::Arc;

use cmp::application::ports::ConsentLogServiceInterface;
use cmp::domain::ports::ConsentPersistence;
use cmp::domain::value_objects::{BannerAction, BannerState, InteractionType, SiteId, VisitorId};
use cmp::infrastructure::bootstrap::ConsentServiceFactory;
use cmp::infrastructure::config::AppConfig;
use cmp::providers::persistence::LocalConsentPersistence;
use cmp::simulate::run_simulation;
use tempfile::TempDir;

fn offline_config(site: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.engine.site_id = site.to_string();
    config.storage.durable = Some("memory".to_string());
    config.storage.legacy = None;
    config
}

fn local_persistence(
    config: &AppConfig,
) -> (Arc<dyn ConsentLogServiceInterface>, Arc<dyn ConsentPersistence>) {
    let service = ConsentServiceFactory::create(config);
    let persistence: Arc<dyn ConsentPersistence> =
        Arc::new(LocalConsentPersistence::new(Arc::clone(&service)));
    (service, persistence)
}

#[tokio::test]
async fn test_accept_is_stored() {
    let config = offline_config("news");
    let (service, persistence) = local_persistence(&config);

    let report = run_simulation(&config, BannerAction::AcceptAll, persistence)
        .await
        .expect("simulation");

    assert_eq!(report.site_id, "news");
    assert_eq!(report.state, BannerState::Suppressed);
    assert_eq!(report.outcome.as_deref(), Some("stored"));
    assert!(!report.identity_degraded);

    let decision = report.decision.expect("decision");
    assert_eq!(decision.interaction_type, InteractionType::AcceptAll);
    assert!(decision.purposes.values().all(|granted| *granted));

    let stored = service
        .lookup(&SiteId::new("news"), &VisitorId::new(report.visitor_id.clone()))
        .await
        .expect("lookup")
        .expect("stored decision");
    assert_eq!(stored.purposes, decision.purposes);
    assert_eq!(service.stored_decisions().await.expect("count"), 1);
}

#[tokio::test]
async fn test_reject_keeps_strictly_necessary() {
    let config = offline_config("shop");
    let (_, persistence) = local_persistence(&config);

    let report = run_simulation(&config, BannerAction::RejectAll, persistence)
        .await
        .expect("simulation");

    let decision = report.decision.expect("decision");
    assert_eq!(decision.interaction_type, InteractionType::RejectAll);
    assert_eq!(decision.purposes.get(&1), Some(&true));
    assert_eq!(decision.purposes.values().filter(|granted| **granted).count(), 1);
}

#[tokio::test]
async fn test_returning_visitor_is_not_asked_again() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = offline_config("news");
    config.storage.durable = Some("file".to_string());
    config.storage.durable_path = Some(dir.path().join("identity.json"));
    let (_, persistence) = local_persistence(&config);

    let first = run_simulation(&config, BannerAction::AcceptAll, Arc::clone(&persistence))
        .await
        .expect("first run");
    let second = run_simulation(&config, BannerAction::RejectAll, persistence)
        .await
        .expect("second run");

    assert_eq!(first.visitor_id, second.visitor_id);
    assert_eq!(second.state, BannerState::Suppressed);
    assert!(second.outcome.is_none());
    assert!(second.decision.is_none());
}

#[tokio::test]
async fn test_preferences_cannot_be_simulated() {
    let config = offline_config("news");
    let (_, persistence) = local_persistence(&config);

    let result = run_simulation(&config, BannerAction::ShowPreferences, persistence).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_report_serializes_camel_case() {
    let config = offline_config("news");
    let (_, persistence) = local_persistence(&config);

    let report = run_simulation(&config, BannerAction::AcceptAll, persistence)
        .await
        .expect("simulation");
    let json = serde_json::to_value(&report).expect("serialize");
    assert!(json.get("visitorId").is_some());
    assert!(json.get("identityDegraded").is_some());
    assert_eq!(json["outcome"], "stored");
}
