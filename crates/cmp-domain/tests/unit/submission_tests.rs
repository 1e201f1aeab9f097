//! Tests for submission payload shapes

use cmp_domain::value_objects::{
    BackendOperation, BannerInteraction, ClientMetadata, ConsentChoices, DecisionSet, DeviceType,
    InteractionType, SubmissionPayload, VisitorId,
};
use std::collections::BTreeMap;

fn payload() -> SubmissionPayload {
    SubmissionPayload {
        visitor_id: VisitorId::new("v-1"),
        decisions: DecisionSet::new(
            ConsentChoices::new(BTreeMap::from([(2, true)]), BTreeMap::new()),
            Some("token".to_string()),
            BackendOperation::Grant,
        ),
        banner_interaction: BannerInteraction {
            interaction_type: InteractionType::AcceptAll,
            time_to_decision: Some(1_250),
        },
        metadata: Some(ClientMetadata::new("Mozilla/5.0 (iPhone)", "en-GB")),
    }
}

#[test]
fn test_payload_wire_shape() {
    let json = serde_json::to_value(payload()).unwrap();
    assert_eq!(json["visitorId"], "v-1");
    assert_eq!(json["decisions"]["purposes"]["1"], true);
    assert_eq!(json["decisions"]["operation"], "grant");
    assert_eq!(json["bannerInteraction"]["type"], "accept_all");
    assert_eq!(json["bannerInteraction"]["timeToDecision"], 1_250);
    assert_eq!(json["metadata"]["deviceType"], "mobile");
}

#[test]
fn test_reduced_payload_drops_optional_fields() {
    let reduced = payload().reduced();
    assert!(reduced.metadata.is_none());
    assert!(reduced.banner_interaction.time_to_decision.is_none());
    assert_eq!(reduced.decisions, payload().decisions);

    let json = serde_json::to_value(&reduced).unwrap();
    assert!(json.get("metadata").is_none());
}

#[test]
fn test_accept_and_reject_map_to_same_backend_operation() {
    assert_eq!(
        BackendOperation::for_interaction(InteractionType::AcceptAll, false),
        BackendOperation::for_interaction(InteractionType::RejectAll, false)
    );
    assert_eq!(
        BackendOperation::for_interaction(InteractionType::RejectAll, true),
        BackendOperation::Update
    );
}

#[test]
fn test_device_type_classification() {
    assert_eq!(
        DeviceType::from_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari"),
        DeviceType::Mobile
    );
    assert_eq!(
        DeviceType::from_user_agent("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)"),
        DeviceType::Tablet
    );
    assert_eq!(
        DeviceType::from_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0"),
        DeviceType::Desktop
    );
}
