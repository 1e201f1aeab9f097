//! Dependency wiring tests

use std::sync::Arc;

use cmp_application::engine::ConsentEngine;
use cmp_application::ports::ConsentLogServiceInterface;
use cmp_domain::constants::VISITOR_ID_STORAGE_KEY;
use cmp_domain::ports::{KeyValueStore, VendorListSource};
use cmp_domain::value_objects::{
    BackendOperation, BannerInteraction, ConsentChoices, DecisionSet, InteractionType, SiteId,
    SubmissionPayload, VisitorId,
};
use cmp_infrastructure::bootstrap::{ConsentServiceFactory, EngineFactory};
use cmp_infrastructure::config::{AppConfig, StorageConfig};
use cmp_providers::document::VirtualDocument;
use cmp_providers::messaging::ChannelMessenger;
use cmp_providers::persistence::LocalConsentPersistence;
use std::collections::BTreeMap;
use tempfile::TempDir;

fn storage(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        durable: Some("file".to_string()),
        durable_path: Some(dir.path().join("identity.json")),
        legacy: Some("cookie".to_string()),
        legacy_initial: Some(format!("theme=dark; {VISITOR_ID_STORAGE_KEY}=legacy-visitor")),
    }
}

#[test]
fn test_identity_stores_resolved_by_name() {
    let dir = TempDir::new().expect("temp dir");
    let (durable, legacy) = EngineFactory::identity_stores(&storage(&dir));

    let durable = durable.expect("durable tier");
    let legacy = legacy.expect("legacy tier");
    assert_eq!(durable.get(VISITOR_ID_STORAGE_KEY).expect("read"), None);
    assert_eq!(
        legacy.get(VISITOR_ID_STORAGE_KEY).expect("read").as_deref(),
        Some("legacy-visitor")
    );
}

#[test]
fn test_unknown_or_disabled_tiers_are_skipped() {
    let config = StorageConfig {
        durable: Some("floppy".to_string()),
        durable_path: None,
        legacy: None,
        legacy_initial: None,
    };
    let (durable, legacy) = EngineFactory::identity_stores(&config);
    assert!(durable.is_none());
    assert!(legacy.is_none());
}

#[tokio::test]
async fn test_vendor_list_from_file_or_standard() {
    let mut config = AppConfig::default();
    config.engine.gvl_version = 7;
    let standard = EngineFactory::vendor_list(&config)
        .expect("vendor list")
        .snapshot()
        .await
        .expect("snapshot");
    assert_eq!(standard.version, 7);
    assert_eq!(standard.purposes.len(), 11);

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vendors.json");
    std::fs::write(
        &path,
        r#"{"version":12,"purposes":[{"id":1,"name":"Storage"}],"vendors":[{"id":755,"name":"Ads"}]}"#,
    )
    .expect("write");
    config.client.vendor_list_path = Some(path);

    let from_file = EngineFactory::vendor_list(&config)
        .expect("vendor list")
        .snapshot()
        .await
        .expect("snapshot");
    assert_eq!(from_file.version, 12);
    assert_eq!(from_file.vendors.len(), 1);
}

#[test]
fn test_invalid_persistence_url_is_rejected() {
    let mut config = AppConfig::default();
    config.client.base_url = "mailto:someone".to_string();
    assert!(EngineFactory::http_persistence(&config.client).is_err());

    config.client.base_url = "http://127.0.0.1:8000".to_string();
    assert!(EngineFactory::http_persistence(&config.client).is_ok());
}

#[tokio::test]
async fn test_engine_wired_from_config_migrates_legacy_identity() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.engine.site_id = "wired-site".to_string();
    config.storage = storage(&dir);

    let service = ConsentServiceFactory::create(&config);
    let persistence = Arc::new(LocalConsentPersistence::new(service));
    let (messenger, _messages) = ChannelMessenger::new();
    let deps = EngineFactory::dependencies_with(
        &config,
        Arc::new(VirtualDocument::new()),
        Arc::new(messenger),
        persistence,
    )
    .expect("dependencies");
    let durable = deps.durable_store.clone().expect("durable tier");

    let engine = ConsentEngine::initialize(deps).expect("engine");
    assert_eq!(engine.visitor_id().as_str(), "legacy-visitor");
    assert!(!engine.identity_degraded());
    assert_eq!(
        durable.get(VISITOR_ID_STORAGE_KEY).expect("read").as_deref(),
        Some("legacy-visitor")
    );
}

#[tokio::test]
async fn test_consent_service_overwrites() {
    let service = ConsentServiceFactory::create(&AppConfig::default());
    let site = SiteId::new("shop");
    let payload = |granted: bool| SubmissionPayload {
        visitor_id: VisitorId::new("v-1"),
        decisions: DecisionSet::new(
            ConsentChoices::new(BTreeMap::from([(2, granted)]), BTreeMap::new()),
            None,
            BackendOperation::Grant,
        ),
        banner_interaction: BannerInteraction {
            interaction_type: InteractionType::SavePreferences,
            time_to_decision: None,
        },
        metadata: None,
    };

    service.record(&site, payload(true)).await.expect("first");
    let second = service.record(&site, payload(false)).await.expect("second");

    assert_eq!(second.purposes, BTreeMap::from([(1, true), (2, false)]));
    assert!(second.consent_token.is_some());
    assert_eq!(service.stored_decisions().await.expect("count"), 1);
    let found = service
        .lookup(&site, &VisitorId::new("v-1"))
        .await
        .expect("lookup")
        .expect("decision");
    assert_eq!(found, second);
}
