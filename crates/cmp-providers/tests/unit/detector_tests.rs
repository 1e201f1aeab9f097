//! Tests for the built-in third-party detectors

use cmp_application::registry::{list_detectors, run_detectors};
use cmp_providers::document::{ElementSpec, VirtualDocument};

#[test]
fn test_builtin_detectors_registered() {
    let names: Vec<&str> = list_detectors().into_iter().map(|(name, _)| name).collect();
    for expected in ["cookiebot", "didomi", "onetrust", "quantcast", "usercentrics"] {
        assert!(names.contains(&expected), "missing detector {expected}");
    }
}

#[test]
fn test_onetrust_banner_detected() {
    let doc = VirtualDocument::new();
    let root = doc
        .append_to_body(ElementSpec::new("div").id("onetrust-banner-sdk"))
        .expect("append");

    let found = run_detectors(&doc).expect("detected");
    assert_eq!(found.name, "onetrust");
    assert_eq!(found.root, root);
}

#[test]
fn test_class_based_detector() {
    let doc = VirtualDocument::new();
    let root = doc
        .append_to_body(ElementSpec::new("div").class("qc-cmp2-container"))
        .expect("append");

    let found = run_detectors(&doc).expect("detected");
    assert_eq!(found.name, "quantcast");
    assert_eq!(found.root, root);
}

#[test]
fn test_plain_page_has_no_detection() {
    let doc = VirtualDocument::new();
    doc.append_to_body(ElementSpec::new("div").id("content"))
        .expect("append");
    assert!(run_detectors(&doc).is_none());
}
