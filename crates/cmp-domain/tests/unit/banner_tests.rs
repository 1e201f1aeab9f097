//! Tests for banner lifecycle vocabulary

use cmp_domain::value_objects::{BannerAction, BannerState, BindingConfidence, InteractionType};

#[test]
fn test_happy_path_transitions_allowed() {
    let path = [
        BannerState::Idle,
        BannerState::AwaitingExistingDecision,
        BannerState::Searching,
        BannerState::Bound,
        BannerState::AwaitingUserChoice,
        BannerState::Submitting,
        BannerState::Suppressed,
    ];
    for pair in path.windows(2) {
        assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn test_failed_reachable_from_anywhere_and_falls_through_to_searching() {
    assert!(BannerState::Submitting.can_transition_to(BannerState::Failed));
    assert!(BannerState::Idle.can_transition_to(BannerState::Failed));
    assert!(BannerState::Failed.can_transition_to(BannerState::Searching));
}

#[test]
fn test_shortcuts_rejected() {
    assert!(!BannerState::Idle.can_transition_to(BannerState::Bound));
    assert!(!BannerState::Suppressed.can_transition_to(BannerState::Searching));
    assert!(!BannerState::Searching.can_transition_to(BannerState::Submitting));
}

#[test]
fn test_marker_parsing() {
    assert_eq!(BannerAction::from_marker("accept-all"), Some(BannerAction::AcceptAll));
    assert_eq!(BannerAction::from_marker(" REJECT_ALL "), Some(BannerAction::RejectAll));
    assert_eq!(BannerAction::from_marker("preferences"), Some(BannerAction::ShowPreferences));
    assert_eq!(BannerAction::from_marker("save"), Some(BannerAction::SavePreferences));
    assert_eq!(BannerAction::from_marker("subscribe"), None);
}

#[test]
fn test_show_preferences_does_not_submit() {
    assert_eq!(BannerAction::ShowPreferences.interaction_type(), None);
    assert_eq!(
        BannerAction::AcceptAll.interaction_type(),
        Some(InteractionType::AcceptAll)
    );
}

#[test]
fn test_confidence_orders_strongest_first() {
    assert!(BindingConfidence::Marker < BindingConfidence::Naming);
    assert!(BindingConfidence::Naming < BindingConfidence::Label);
}
