//! Engine simulation
//!
//! Runs one engine instance against a virtual page carrying a marked
//! banner, activates the chosen control and reports what was stored.

use std::sync::Arc;

use cmp_application::engine::ConsentEngine;
use cmp_application::use_cases::SubmissionOutcome;
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::{ConsentPersistence, ElementHandle, PageDocument};
use cmp_domain::value_objects::{BannerAction, BannerState, ConsentDecision};
use cmp_infrastructure::bootstrap::EngineFactory;
use cmp_infrastructure::config::AppConfig;
use cmp_providers::document::{ElementSpec, VirtualDocument};
use cmp_providers::messaging::ChannelMessenger;
use serde::Serialize;
use tracing::info;

/// What a simulation did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Site the engine ran for
    pub site_id: String,
    /// Visitor identifier in use
    pub visitor_id: String,
    /// Whether the identifier only lived in memory
    pub identity_degraded: bool,
    /// Controller state once the page settled
    pub state: BannerState,
    /// Submission outcome, absent when a stored decision suppressed the banner
    pub outcome: Option<String>,
    /// Decision acknowledged by the service
    pub decision: Option<ConsentDecision>,
}

/// Handles of the simulated banner
struct DemoBanner {
    accept: ElementHandle,
    reject: ElementHandle,
}

fn demo_page(banner_id: &str) -> Result<(VirtualDocument, DemoBanner)> {
    let doc = VirtualDocument::new();
    let root = doc.append_to_body(
        ElementSpec::new("div")
            .id(banner_id)
            .attr("role", "dialog")
            .hidden(),
    )?;
    doc.append(
        root,
        ElementSpec::new("p").text("We use cookies to personalise content and ads."),
    )?;
    let accept = doc.append(root, ElementSpec::button("Accept all").action("accept_all"))?;
    let reject = doc.append(root, ElementSpec::button("Reject all").action("reject_all"))?;
    Ok((doc, DemoBanner { accept, reject }))
}

fn describe(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Stored(_) => "stored".to_string(),
        SubmissionOutcome::StoredReduced(_) => "stored_reduced".to_string(),
        SubmissionOutcome::SkippedInFlight => "skipped_in_flight".to_string(),
        SubmissionOutcome::Abandoned { reason } => format!("abandoned: {reason}"),
    }
}

/// Run the engine once and activate `action` when the banner is shown
pub async fn run_simulation(
    config: &AppConfig,
    action: BannerAction,
    persistence: Arc<dyn ConsentPersistence>,
) -> Result<SimulationReport> {
    let (doc, banner) = demo_page(&config.engine.banner_element_id)?;
    let doc = Arc::new(doc);
    let document: Arc<dyn PageDocument> = doc.clone();
    let (messenger, _replies) = ChannelMessenger::new();

    let deps = EngineFactory::dependencies_with(
        config,
        document,
        Arc::new(messenger),
        persistence,
    )?;
    let engine = ConsentEngine::initialize(deps)?;
    let mut state = engine.run().await;
    info!(state = %state, "Page settled");

    let mut outcome = None;
    let mut decision = None;
    if state == BannerState::AwaitingUserChoice {
        let control = match action {
            BannerAction::AcceptAll => banner.accept,
            BannerAction::RejectAll => banner.reject,
            other => {
                return Err(Error::invalid_argument(format!(
                    "cannot simulate '{other}' on the demo banner"
                )));
            }
        };
        doc.click(control);
        if let Some(settled) = engine.controller().wait_for_submission().await {
            if let SubmissionOutcome::Stored(d) | SubmissionOutcome::StoredReduced(d) = &settled {
                decision = Some(d.clone());
            }
            outcome = Some(describe(&settled));
        }
        state = engine.controller().state();
    }

    Ok(SimulationReport {
        site_id: config.engine.site_id.clone(),
        visitor_id: engine.visitor_id().to_string(),
        identity_degraded: engine.identity_degraded(),
        state,
        outcome,
        decision,
    })
}
