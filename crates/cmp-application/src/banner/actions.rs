//! Control-to-action resolution
//!
//! Maps the interactive controls inside a banner root onto canonical
//! [`BannerAction`]s. The fallback chain is ordered by confidence:
//!
//! 1. explicit `data-cmp-action` marker
//! 2. id/class naming convention
//! 3. visible label text
//!
//! Naming and label matching are guesses. A weaker tier only binds an
//! action when no control matched that action through a stronger tier.

use cmp_domain::constants::{
    ACTION_MARKER_ATTRIBUTE, PANEL_MARKER_ATTRIBUTE, PREFERENCES_PANEL, PURPOSE_MARKER_ATTRIBUTE,
    VENDOR_MARKER_ATTRIBUTE,
};
use cmp_domain::ports::{ElementHandle, ElementSnapshot};
use cmp_domain::value_objects::{
    BannerAction, BindingConfidence, ConsentChoices, PurposeId, VendorId, VendorListSnapshot,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Pattern tables, checked in order. Save comes before accept so that
/// "accept selection" style controls are not mistaken for accept-all, and
/// reject comes before accept so that "accept necessary" refuses.
///
/// Naming patterns run against whole `id`/class tokens joined by spaces.
const NAMING_PATTERNS: &[(BannerAction, &str)] = &[
    (
        BannerAction::SavePreferences,
        r"\b(save|accept ?selection|confirm ?(choices|selection|preferences)|submit ?(choices|preferences))\b",
    ),
    (
        BannerAction::RejectAll,
        r"\b(reject|rejectall|decline|deny|refuse|disagree|no|necessary|necessaryonly|onlynecessary|essential)\b",
    ),
    (
        BannerAction::AcceptAll,
        r"\b(accept|acceptall|agree|allow ?all|consent ?all)\b",
    ),
    (
        BannerAction::ShowPreferences,
        r"\b(preferences|settings|customi[sz]e|manage|options)\b",
    ),
];

const LABEL_PATTERNS: &[(BannerAction, &str)] = &[
    (
        BannerAction::SavePreferences,
        r"^(save|confirm)\b|\b(save|confirm) (my )?(choices|selection|preferences|settings)\b|accept selection",
    ),
    (
        BannerAction::RejectAll,
        r"\b(reject|decline|deny|refuse|disagree)\b|only (strictly )?(necessary|essential)|(necessary|essential) only|no,? thanks",
    ),
    (
        BannerAction::AcceptAll,
        r"\b(accept|agree|allow all|allow cookies|got it)\b|^ok$",
    ),
    (
        BannerAction::ShowPreferences,
        r"preferences|settings|customi[sz]e|manage|more options",
    ),
];

static NAMING_RULES: Lazy<Vec<(BannerAction, Regex)>> = Lazy::new(|| compile(NAMING_PATTERNS));
static LABEL_RULES: Lazy<Vec<(BannerAction, Regex)>> = Lazy::new(|| compile(LABEL_PATTERNS));

fn compile(patterns: &[(BannerAction, &str)]) -> Vec<(BannerAction, Regex)> {
    patterns
        .iter()
        .filter_map(|(action, pattern)| Regex::new(pattern).ok().map(|re| (*action, re)))
        .collect()
}

/// A control bound to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBinding {
    /// Canonical action
    pub action: BannerAction,
    /// Control element
    pub element: ElementHandle,
    /// How the match was made
    pub confidence: BindingConfidence,
}

/// Classify a single control
pub fn classify_control(control: &ElementSnapshot) -> Option<(BannerAction, BindingConfidence)> {
    if let Some(action) = control
        .attribute(ACTION_MARKER_ATTRIBUTE)
        .and_then(BannerAction::from_marker)
    {
        return Some((action, BindingConfidence::Marker));
    }
    if !control.is_control() {
        return None;
    }

    let naming = control.naming_tokens().join(" ");
    if let Some(action) = first_match(&NAMING_RULES, &naming) {
        return Some((action, BindingConfidence::Naming));
    }

    let label = normalize_label(&control.text);
    first_match(&LABEL_RULES, &label).map(|action| (action, BindingConfidence::Label))
}

/// Bind every action that has at least one matching control
///
/// For each action only the controls of the strongest tier are kept.
/// Bindings come back in document order.
pub fn resolve_actions(controls: &[ElementSnapshot]) -> Vec<ActionBinding> {
    let candidates: Vec<ActionBinding> = controls
        .iter()
        .filter_map(|control| {
            classify_control(control).map(|(action, confidence)| ActionBinding {
                action,
                element: control.handle,
                confidence,
            })
        })
        .collect();

    let mut strongest: BTreeMap<&'static str, BindingConfidence> = BTreeMap::new();
    for binding in &candidates {
        strongest
            .entry(binding.action.as_str())
            .and_modify(|best| *best = (*best).min(binding.confidence))
            .or_insert(binding.confidence);
    }

    candidates
        .into_iter()
        .filter(|binding| strongest.get(binding.action.as_str()) == Some(&binding.confidence))
        .collect()
}

/// The preferences panel inside the banner, if the markup declares one
pub fn find_preferences_panel(descendants: &[ElementSnapshot]) -> Option<ElementHandle> {
    descendants
        .iter()
        .find(|element| element.attribute(PANEL_MARKER_ATTRIBUTE) == Some(PREFERENCES_PANEL))
        .map(|element| element.handle)
}

/// Granular choices from the preference checkboxes
///
/// Starts from a reject-all baseline so unticked or missing boxes refuse.
pub fn read_preferences(
    descendants: &[ElementSnapshot],
    catalog: &VendorListSnapshot,
) -> ConsentChoices {
    let mut choices = ConsentChoices::reject_all(catalog);
    for element in descendants {
        let Some(checked) = element.checked else {
            continue;
        };
        if let Some(id) = marker_id::<PurposeId>(element, PURPOSE_MARKER_ATTRIBUTE) {
            choices.purposes.insert(id, checked);
        }
        if let Some(id) = marker_id::<VendorId>(element, VENDOR_MARKER_ATTRIBUTE) {
            choices.vendors.insert(id, checked);
        }
    }
    choices.normalized()
}

fn marker_id<T: FromStr>(element: &ElementSnapshot, attribute: &str) -> Option<T> {
    element.attribute(attribute)?.trim().parse().ok()
}

fn first_match(rules: &[(BannerAction, Regex)], haystack: &str) -> Option<BannerAction> {
    if haystack.is_empty() {
        return None;
    }
    rules
        .iter()
        .find(|(_, re)| re.is_match(haystack))
        .map(|(action, _)| *action)
}

fn normalize_label(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
