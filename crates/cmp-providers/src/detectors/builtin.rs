//! Detectors for widely deployed consent banners
//!
//! | Detector | Recognized by |
//! |----------|---------------|
//! | `cookiebot` | `#CybotCookiebotDialog` |
//! | `cookieyes` | `.cky-consent-container` |
//! | `didomi` | `#didomi-popup` or `#didomi-notice` |
//! | `onetrust` | `#onetrust-banner-sdk` |
//! | `quantcast` | `.qc-cmp2-container` |
//! | `usercentrics` | `#usercentrics-root` |

use cmp_application::registry::{CMP_DETECTORS, CmpDetectorEntry};
use cmp_domain::ports::{ElementHandle, PageDocument};

fn first_by_id(document: &dyn PageDocument, ids: &[&str]) -> Option<ElementHandle> {
    ids.iter()
        .find_map(|id| document.element_by_id(id))
        .map(|element| element.handle)
}

fn first_by_class(document: &dyn PageDocument, class: &str) -> Option<ElementHandle> {
    document
        .elements()
        .into_iter()
        .find(|element| element.has_class(class))
        .map(|element| element.handle)
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

const COOKIEBOT_IDS: &[&str] = &["CybotCookiebotDialog"];
const DIDOMI_IDS: &[&str] = &["didomi-popup", "didomi-notice"];
const ONETRUST_IDS: &[&str] = &["onetrust-banner-sdk"];
const USERCENTRICS_IDS: &[&str] = &["usercentrics-root"];
const COOKIEYES_CLASS: &str = "cky-consent-container";
const QUANTCAST_CLASS: &str = "qc-cmp2-container";

fn cookiebot_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_id(document, COOKIEBOT_IDS)
}

fn cookiebot_present(document: &dyn PageDocument) -> bool {
    cookiebot_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static COOKIEBOT: CmpDetectorEntry = CmpDetectorEntry {
    name: "cookiebot",
    description: "Cookiebot consent dialog",
    predicate: cookiebot_present,
    extractor: cookiebot_root,
};

fn cookieyes_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_class(document, COOKIEYES_CLASS)
}

fn cookieyes_present(document: &dyn PageDocument) -> bool {
    cookieyes_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static COOKIEYES: CmpDetectorEntry = CmpDetectorEntry {
    name: "cookieyes",
    description: "CookieYes consent container",
    predicate: cookieyes_present,
    extractor: cookieyes_root,
};

fn didomi_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_id(document, DIDOMI_IDS)
}

fn didomi_present(document: &dyn PageDocument) -> bool {
    didomi_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static DIDOMI: CmpDetectorEntry = CmpDetectorEntry {
    name: "didomi",
    description: "Didomi popup or notice",
    predicate: didomi_present,
    extractor: didomi_root,
};

fn onetrust_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_id(document, ONETRUST_IDS)
}

fn onetrust_present(document: &dyn PageDocument) -> bool {
    onetrust_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static ONETRUST: CmpDetectorEntry = CmpDetectorEntry {
    name: "onetrust",
    description: "OneTrust banner SDK container",
    predicate: onetrust_present,
    extractor: onetrust_root,
};

fn quantcast_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_class(document, QUANTCAST_CLASS)
}

fn quantcast_present(document: &dyn PageDocument) -> bool {
    quantcast_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static QUANTCAST: CmpDetectorEntry = CmpDetectorEntry {
    name: "quantcast",
    description: "Quantcast Choice container",
    predicate: quantcast_present,
    extractor: quantcast_root,
};

fn usercentrics_root(document: &dyn PageDocument) -> Option<ElementHandle> {
    first_by_id(document, USERCENTRICS_IDS)
}

fn usercentrics_present(document: &dyn PageDocument) -> bool {
    usercentrics_root(document).is_some()
}

#[linkme::distributed_slice(CMP_DETECTORS)]
static USERCENTRICS: CmpDetectorEntry = CmpDetectorEntry {
    name: "usercentrics",
    description: "Usercentrics root element",
    predicate: usercentrics_present,
    extractor: usercentrics_root,
};
