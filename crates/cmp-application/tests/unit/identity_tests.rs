//! Tests for the visitor identity store

use std::sync::Arc;

use cmp_application::use_cases::{IdentitySource, IdentityStore};
use cmp_domain::constants::VISITOR_ID_STORAGE_KEY as KEY;
use cmp_domain::ports::KeyValueStore;
use cmp_providers::storage::{CookieStringStore, InMemoryKeyValueStore};

fn store(
    durable: Option<Arc<InMemoryKeyValueStore>>,
    legacy: Option<Arc<dyn KeyValueStore>>,
) -> IdentityStore {
    IdentityStore::new(KEY, durable.map(|d| d as Arc<dyn KeyValueStore>), legacy)
}

#[test]
fn test_generated_id_is_persisted_and_stable() {
    let durable = Arc::new(InMemoryKeyValueStore::new());
    let identity = store(Some(Arc::clone(&durable)), None);

    let (first, source) = identity.resolve();
    assert_eq!(source, IdentitySource::Generated);
    assert_eq!(durable.peek(KEY).as_deref(), Some(first.as_str()));

    let (second, source) = identity.resolve();
    assert_eq!(second, first);
    assert_eq!(source, IdentitySource::Session);
    assert!(!identity.is_degraded());
}

#[test]
fn test_new_instance_reads_durable_tier() {
    let durable = Arc::new(InMemoryKeyValueStore::new());
    let first = store(Some(Arc::clone(&durable)), None).get_or_create_visitor_id();

    let (again, source) = store(Some(durable), None).resolve();
    assert_eq!(again, first);
    assert_eq!(source, IdentitySource::Durable);
}

#[test]
fn test_legacy_id_migrates_forward() {
    let durable = Arc::new(InMemoryKeyValueStore::new());
    let legacy: Arc<dyn KeyValueStore> =
        Arc::new(CookieStringStore::new(format!("theme=dark; {KEY}=legacy-visitor")));
    let identity = store(Some(Arc::clone(&durable)), Some(legacy));

    let (visitor, source) = identity.resolve();
    assert_eq!(visitor.as_str(), "legacy-visitor");
    assert_eq!(source, IdentitySource::MigratedFromLegacy);
    assert_eq!(durable.peek(KEY).as_deref(), Some("legacy-visitor"));
}

#[test]
fn test_durable_tier_wins_over_legacy() {
    let durable = Arc::new(InMemoryKeyValueStore::new().with_entry(KEY, "durable-visitor"));
    let legacy: Arc<dyn KeyValueStore> =
        Arc::new(CookieStringStore::new(format!("{KEY}=legacy-visitor")));

    let (visitor, source) = store(Some(durable), Some(legacy)).resolve();
    assert_eq!(visitor.as_str(), "durable-visitor");
    assert_eq!(source, IdentitySource::Durable);
}

#[test]
fn test_failing_durable_tier_degrades_to_memory() {
    let durable = Arc::new(InMemoryKeyValueStore::named("durable"));
    durable.set_failing(true);
    let identity = store(Some(durable), None);

    let (visitor, source) = identity.resolve();
    assert!(!visitor.is_empty());
    assert_eq!(source, IdentitySource::Memory);
    assert!(identity.is_degraded());
    assert_eq!(identity.get_or_create_visitor_id(), visitor);
}

#[test]
fn test_legacy_only_keeps_id_in_memory() {
    let legacy: Arc<dyn KeyValueStore> = Arc::new(CookieStringStore::new(format!("{KEY}=old")));
    let identity = store(None, Some(legacy));

    let (visitor, source) = identity.resolve();
    assert_eq!(visitor.as_str(), "old");
    assert_eq!(source, IdentitySource::Memory);
    assert!(identity.is_degraded());
}
