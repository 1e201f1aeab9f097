//! Third-party CMP Detector Registry
//!
//! Pages frequently embed another vendor's consent banner. Each detector
//! recognizes one such banner and extracts its root element, so discovery
//! can bind to it before falling back to the scored heuristic.

use cmp_domain::ports::{ElementHandle, PageDocument};
use tracing::debug;

/// Registry entry for a third-party banner detector
pub struct CmpDetectorEntry {
    /// Unique detector name (e.g., "onetrust", "cookiebot")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether the vendor's banner is present
    pub predicate: fn(&dyn PageDocument) -> bool,
    /// Root element of the vendor's banner
    pub extractor: fn(&dyn PageDocument) -> Option<ElementHandle>,
}

#[linkme::distributed_slice]
pub static CMP_DETECTORS: [CmpDetectorEntry] = [..];

/// A detector that matched the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorMatch {
    /// Detector name
    pub name: &'static str,
    /// Extracted banner root
    pub root: ElementHandle,
}

/// Run every registered detector, returning the first usable match
///
/// Detectors are consulted in name order so the result does not depend on
/// link order.
pub fn run_detectors(document: &dyn PageDocument) -> Option<DetectorMatch> {
    let mut entries: Vec<&CmpDetectorEntry> = CMP_DETECTORS.iter().collect();
    entries.sort_by_key(|entry| entry.name);

    entries.into_iter().find_map(|entry| {
        if !(entry.predicate)(document) {
            return None;
        }
        let root = (entry.extractor)(document);
        if root.is_none() {
            debug!(detector = entry.name, "Detector matched but extracted no root");
        }
        root.map(|root| DetectorMatch {
            name: entry.name,
            root,
        })
    })
}

/// List all registered detectors as (name, description)
pub fn list_detectors() -> Vec<(&'static str, &'static str)> {
    let mut detectors: Vec<_> = CMP_DETECTORS
        .iter()
        .map(|entry| (entry.name, entry.description))
        .collect();
    detectors.sort_unstable();
    detectors
}
