//! Tests for the virtual page document

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cmp_domain::error::Error;
use cmp_domain::ports::{FallbackBannerSpec, FrameParent};
use cmp_providers::document::{ElementSpec, VirtualDocument};
use cmp_providers::PageDocument;

#[test]
fn test_elements_in_document_order_with_text() {
    let doc = VirtualDocument::new();
    let banner = doc
        .append_to_body(ElementSpec::new("div").id("banner").class("cookie-notice"))
        .expect("banner");
    doc.append(banner, ElementSpec::new("p").text("We use cookies"))
        .expect("text");
    doc.append(banner, ElementSpec::button("Accept")).expect("button");

    let tags: Vec<String> = doc.elements().into_iter().map(|e| e.tag).collect();
    assert_eq!(tags, vec!["html", "head", "body", "div", "p", "button"]);

    let snapshot = doc.element_by_id("banner").expect("by id");
    assert_eq!(snapshot.text, "We use cookies Accept");
    assert!(snapshot.has_class("cookie-notice"));
    assert_eq!(doc.descendants(banner).len(), 2);
}

#[test]
fn test_click_runs_listeners() {
    let doc = VirtualDocument::new();
    let button = doc.append_to_body(ElementSpec::button("OK")).expect("button");
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&clicks);
    doc.add_activation_listener(
        button,
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .expect("listener");

    assert_eq!(doc.click(button), 1);
    assert_eq!(doc.click(button), 1);
    assert_eq!(clicks.load(Ordering::SeqCst), 2);
}

#[test]
fn test_claim_is_exclusive() {
    let doc = VirtualDocument::new();
    assert!(doc.try_claim_engine());
    assert!(!doc.try_claim_engine());
    assert!(doc.is_claimed());
}

#[test]
fn test_frames_need_a_parsed_parent() {
    let doc = VirtualDocument::unparsed();
    assert!(matches!(
        doc.attach_frame(FrameParent::Head, "__tcfapiLocator"),
        Err(Error::NotFound { .. })
    ));

    doc.finish_parsing();
    doc.attach_frame(FrameParent::Body, "__tcfapiLocator")
        .expect("attach");
    assert!(doc.has_frame("__tcfapiLocator"));
    assert!(!doc.has_frame("other"));
}

#[test]
fn test_synthesized_banner_has_marked_controls() {
    let doc = VirtualDocument::new();
    let spec = FallbackBannerSpec::default();
    let banner = doc.synthesize_banner(&spec).expect("synthesize");

    let root = doc.snapshot(banner.root).expect("root");
    assert_eq!(root.id.as_deref(), Some(spec.element_id.as_str()));
    assert!(!root.visible);

    let accept = doc.snapshot(banner.accept).expect("accept");
    assert_eq!(accept.attribute("data-cmp-action"), Some("accept_all"));
    let reject = doc.snapshot(banner.reject).expect("reject");
    assert_eq!(reject.attribute("data-cmp-action"), Some("reject_all"));
}

#[tokio::test]
async fn test_mutation_observer_notifies_and_disconnects() {
    let doc = VirtualDocument::new();
    let mut observer = doc.observe_mutations();
    assert_eq!(doc.observer_count(), 1);

    doc.append_to_body(ElementSpec::new("div")).expect("append");
    assert_eq!(observer.next_mutation().await, Some(()));

    observer.disconnect();
    assert_eq!(doc.observer_count(), 0);
}

#[test]
fn test_dropped_observer_disconnects() {
    let doc = VirtualDocument::new();
    {
        let _observer = doc.observe_mutations();
        assert_eq!(doc.observer_count(), 1);
    }
    assert_eq!(doc.observer_count(), 0);
}
