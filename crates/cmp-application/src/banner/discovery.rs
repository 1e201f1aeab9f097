//! Banner discovery
//!
//! Locates the banner root, in order of preference:
//!
//! 1. the well-known element id
//! 2. a registered third-party CMP detector
//! 3. a scored heuristic scan of the document
//! 4. the same checks repeated on a bounded retry schedule and on DOM
//!    mutations, until the hard discovery window elapses
//! 5. a synthesized fallback banner
//!
//! The mutation observer is disconnected on every exit path.

use super::actions::classify_control;
use crate::registry::run_detectors;
use cmp_domain::ports::{
    ElementHandle, ElementSnapshot, FallbackBanner, FallbackBannerSpec, PageDocument,
};
use cmp_domain::value_objects::{BannerAction, DiscoveryMethod, EngineSettings};
use cmp_domain::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Minimum heuristic score for an element to count as a banner
pub const HEURISTIC_SCORE_THRESHOLD: u32 = 6;

/// Elements with more text than this are page sections, not banners
const MAX_BANNER_TEXT_LEN: usize = 1200;

const NAMING_WEIGHTS: &[(&str, u32)] = &[
    ("consent", 4),
    ("cookie", 3),
    ("gdpr", 3),
    ("privacy", 2),
    ("banner", 2),
    ("cmp", 2),
    ("notice", 1),
];

const TEXT_WEIGHTS: &[(&str, u32)] = &[
    ("cookie", 3),
    ("consent", 2),
    ("privacy", 1),
    ("personal data", 1),
];

const SKIPPED_TAGS: &[&str] = &["html", "head", "body", "script", "style", "meta", "link", "main"];

/// Retry schedule and hard window of the discovery phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryBudget {
    /// Maximum number of scans, the initial one included
    pub max_attempts: u32,
    /// Fixed delay between scans
    pub retry_delay: Duration,
    /// Wall-clock budget, mutation observation included
    pub window: Duration,
}

impl From<&EngineSettings> for DiscoveryBudget {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            max_attempts: settings.discovery_max_attempts.max(1),
            retry_delay: settings.discovery_retry_delay(),
            window: settings.discovery_window(),
        }
    }
}

/// Result of the discovery phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBanner {
    /// Banner root
    pub root: ElementHandle,
    /// How it was found
    pub method: DiscoveryMethod,
    /// Number of scans performed
    pub attempts: u32,
    /// Controls of a synthesized banner
    pub fallback: Option<FallbackBanner>,
}

/// Locates or synthesizes the banner root
pub struct BannerLocator {
    document: Arc<dyn PageDocument>,
    banner_element_id: String,
    budget: DiscoveryBudget,
    fallback: FallbackBannerSpec,
}

impl BannerLocator {
    /// Create a locator
    pub fn new(
        document: Arc<dyn PageDocument>,
        banner_element_id: impl Into<String>,
        budget: DiscoveryBudget,
    ) -> Self {
        let banner_element_id = banner_element_id.into();
        let fallback = FallbackBannerSpec {
            element_id: banner_element_id.clone(),
            ..FallbackBannerSpec::default()
        };
        Self {
            document,
            banner_element_id,
            budget,
            fallback,
        }
    }

    /// Override the fallback banner text
    pub fn with_fallback(mut self, fallback: FallbackBannerSpec) -> Self {
        self.fallback = fallback;
        self
    }

    /// One synchronous scan of the document
    pub fn locate_once(&self) -> Option<(ElementHandle, DiscoveryMethod)> {
        if let Some(element) = self.document.element_by_id(&self.banner_element_id) {
            return Some((element.handle, DiscoveryMethod::WellKnownId));
        }

        if let Some(found) = run_detectors(self.document.as_ref()) {
            return Some((
                found.root,
                DiscoveryMethod::Detector {
                    name: found.name.to_string(),
                },
            ));
        }

        self.best_heuristic_candidate()
            .map(|(root, score)| (root, DiscoveryMethod::Heuristic { score }))
    }

    /// Run the whole discovery phase
    ///
    /// Always resolves within the window plus one scan; the only error is a
    /// host that refuses to synthesize the fallback banner.
    pub async fn discover(&self) -> Result<DiscoveredBanner> {
        if let Some((root, method)) = self.locate_once() {
            return Ok(self.found(root, method, 1));
        }

        let deadline = Instant::now() + self.budget.window;
        let mut observer = self.document.observe_mutations();
        let mut mutations_open = true;
        let mut attempts: u32 = 1;
        let mut next_retry = Instant::now() + self.budget.retry_delay;

        let located = loop {
            let retries_left = attempts < self.budget.max_attempts;
            if !retries_left && !mutations_open {
                break None;
            }

            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    debug!(attempts, "Discovery window elapsed");
                    break None;
                }
                () = tokio::time::sleep_until(next_retry), if retries_left => {
                    attempts += 1;
                    next_retry = Instant::now() + self.budget.retry_delay;
                    if let Some(found) = self.locate_once() {
                        break Some(found);
                    }
                }
                mutation = observer.next_mutation(), if mutations_open => {
                    if mutation.is_none() {
                        mutations_open = false;
                        continue;
                    }
                    if let Some(found) = self.locate_once() {
                        break Some(found);
                    }
                }
            }
        };
        observer.disconnect();

        match located {
            Some((root, method)) => Ok(self.found(root, method, attempts)),
            None => self.synthesize(attempts),
        }
    }

    fn found(
        &self,
        root: ElementHandle,
        method: DiscoveryMethod,
        attempts: u32,
    ) -> DiscoveredBanner {
        info!(root = %root, ?method, attempts, "Banner located");
        DiscoveredBanner {
            root,
            method,
            attempts,
            fallback: None,
        }
    }

    fn synthesize(&self, attempts: u32) -> Result<DiscoveredBanner> {
        warn!(attempts, "No banner found, synthesizing fallback");
        let banner = self.document.synthesize_banner(&self.fallback).map_err(|e| {
            warn!(error = %e, "Fallback banner synthesis failed");
            Error::BannerNotFound { attempts }
        })?;
        Ok(DiscoveredBanner {
            root: banner.root,
            method: DiscoveryMethod::Synthesized,
            attempts,
            fallback: Some(banner),
        })
    }

    fn best_heuristic_candidate(&self) -> Option<(ElementHandle, u32)> {
        self.document
            .elements()
            .into_iter()
            .filter(|element| !SKIPPED_TAGS.contains(&element.tag.as_str()))
            .filter_map(|element| {
                let base = base_score(&element);
                if base == 0 {
                    return None;
                }
                let controls = self.document.descendants(element.handle);
                let score = base + control_score(&controls);
                (score >= HEURISTIC_SCORE_THRESHOLD).then_some((element, score))
            })
            // Highest score wins; ties go to the tighter element
            .max_by(|(a, score_a), (b, score_b)| {
                score_a
                    .cmp(score_b)
                    .then_with(|| b.text.len().cmp(&a.text.len()))
            })
            .map(|(element, score)| (element.handle, score))
    }
}

/// Score from naming, text and ARIA role
pub fn base_score(element: &ElementSnapshot) -> u32 {
    let naming = element.naming();
    let mut score: u32 = NAMING_WEIGHTS
        .iter()
        .filter(|(word, _)| naming.contains(word))
        .map(|(_, weight)| weight)
        .sum();

    if element.text.len() <= MAX_BANNER_TEXT_LEN {
        let text = element.text.to_lowercase();
        score += TEXT_WEIGHTS
            .iter()
            .filter(|(word, _)| text.contains(word))
            .map(|(_, weight)| weight)
            .sum::<u32>();
    }

    if matches!(element.attribute("role"), Some("dialog" | "alertdialog" | "region"))
        || element.attribute("aria-modal") == Some("true")
    {
        score += 1;
    }
    score
}

/// Bonus for containing accept or reject controls
pub fn control_score(descendants: &[ElementSnapshot]) -> u32 {
    let mut has_accept = false;
    let mut has_reject = false;
    for control in descendants {
        match classify_control(control).map(|(action, _)| action) {
            Some(BannerAction::AcceptAll) => has_accept = true,
            Some(BannerAction::RejectAll) => has_reject = true,
            _ => {}
        }
    }
    u32::from(has_accept) * 2 + u32::from(has_reject) * 2
}
