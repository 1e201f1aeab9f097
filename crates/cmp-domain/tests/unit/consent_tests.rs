//! Tests for the consent decision model

use chrono::{Duration, Utc};
use cmp_domain::value_objects::{
    ConsentChoices, ConsentDecision, InteractionType, SiteId, VendorListSnapshot, VisitorId,
};
use std::collections::BTreeMap;

fn decision(purposes: BTreeMap<u16, bool>) -> ConsentDecision {
    ConsentDecision::new(
        VisitorId::new("visitor-1"),
        SiteId::new("site-1"),
        ConsentChoices::new(purposes, BTreeMap::new()),
        None,
        InteractionType::SavePreferences,
    )
}

#[test]
fn test_purpose_one_forced_true() {
    let decision = decision(BTreeMap::from([(1, false), (2, true)]));
    assert_eq!(decision.purposes.get(&1), Some(&true));
    assert_eq!(decision.purposes.get(&2), Some(&true));
}

#[test]
fn test_purpose_one_added_when_absent() {
    let decision = decision(BTreeMap::new());
    assert_eq!(decision.purposes, BTreeMap::from([(1, true)]));
}

#[test]
fn test_absent_purpose_defaults_false() {
    let choices = ConsentChoices::new(BTreeMap::from([(3, true)]), BTreeMap::new());
    assert!(choices.purpose(3));
    assert!(!choices.purpose(7));
    assert!(!choices.vendor(755));
}

#[test]
fn test_accept_all_grants_catalog() {
    let catalog = VendorListSnapshot::standard(42).with_vendor(755, "Example Ads");
    let choices = ConsentChoices::accept_all(&catalog);
    assert_eq!(choices.purposes.len(), 11);
    assert!(choices.purposes.values().all(|granted| *granted));
    assert_eq!(choices.vendors, BTreeMap::from([(755, true)]));
}

#[test]
fn test_reject_all_keeps_only_purpose_one() {
    let catalog = VendorListSnapshot::standard(42).with_vendor(755, "Example Ads");
    let choices = ConsentChoices::reject_all(&catalog);
    assert!(choices.purpose(1));
    assert!((2..=11).all(|id| !choices.purpose(id)));
    assert_eq!(choices.vendors, BTreeMap::from([(755, false)]));
}

#[test]
fn test_decision_json_uses_camel_case_and_integer_keys() {
    let decision = decision(BTreeMap::from([(1, true), (2, false)]));
    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["visitorId"], "visitor-1");
    assert_eq!(json["interactionType"], "save_preferences");
    assert_eq!(json["purposes"]["2"], false);

    let back: ConsentDecision = serde_json::from_value(json).unwrap();
    assert_eq!(back.purposes, BTreeMap::from([(1, true), (2, false)]));
}

#[test]
fn test_expired_decision_is_not_valid() {
    let mut decision = decision(BTreeMap::new());
    let visitor = VisitorId::new("visitor-1");
    let site = SiteId::new("site-1");
    assert!(decision.is_valid_for(&visitor, &site, Utc::now(), 390));

    decision.created_at = Utc::now() - Duration::days(400);
    assert!(!decision.is_valid_for(&visitor, &site, Utc::now(), 390));
}

#[test]
fn test_decision_for_other_site_is_not_valid() {
    let decision = decision(BTreeMap::new());
    assert!(!decision.is_valid_for(
        &VisitorId::new("visitor-1"),
        &SiteId::new("other-site"),
        Utc::now(),
        390
    ));
}
