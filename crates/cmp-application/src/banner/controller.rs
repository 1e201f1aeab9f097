//! Banner Lifecycle Controller
//!
//! State machine deciding whether the banner is shown, binding visitor
//! actions to it and handing decisions to the submission client.
//!
//! ```text
//! Idle → AwaitingExistingDecision ─┬→ Suppressed            (valid decision restored)
//!                                  └→ Searching → Bound → AwaitingUserChoice
//!                                                           → Submitting → Suppressed
//! any → Failed → Searching
//! ```
//!
//! Lookup failures and timeouts fail open toward showing the banner. Only a
//! successfully read, unexpired decision suppresses it.

use super::actions::{ActionBinding, find_preferences_panel, read_preferences, resolve_actions};
use super::discovery::{BannerLocator, DiscoveryBudget};
use crate::tcf::CommandStub;
use crate::use_cases::{ExistingDecision, SubmissionClient, SubmissionOutcome};
use chrono::Utc;
use cmp_domain::ports::{ActivationHandler, ElementHandle, PageDocument, VendorListSource};
use cmp_domain::value_objects::{
    BannerAction, BannerState, BindingConfidence, ConsentChoices, EngineSettings,
    VendorListSnapshot,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Collaborators of the controller
pub struct ControllerDeps {
    /// Engine settings
    pub settings: EngineSettings,
    /// Host page
    pub document: Arc<dyn PageDocument>,
    /// Vendor list
    pub vendor_list: Arc<dyn VendorListSource>,
    /// TCF stub to notify
    pub stub: Arc<CommandStub>,
    /// Persistence client
    pub submission: Arc<SubmissionClient>,
    /// Whether the visitor id only lives in memory
    pub identity_degraded: bool,
}

#[derive(Debug, Clone, Copy)]
struct BoundBanner {
    root: ElementHandle,
    panel: Option<ElementHandle>,
}

struct ControllerInner {
    settings: EngineSettings,
    document: Arc<dyn PageDocument>,
    vendor_list: Arc<dyn VendorListSource>,
    stub: Arc<CommandStub>,
    submission: Arc<SubmissionClient>,
    identity_degraded: bool,
    state: watch::Sender<BannerState>,
    history: Mutex<Vec<BannerState>>,
    bound: Mutex<Option<BoundBanner>>,
    catalog: Mutex<VendorListSnapshot>,
    had_prior_decision: AtomicBool,
    last_activation: Mutex<Option<Instant>>,
    submission_task: Mutex<Option<JoinHandle<SubmissionOutcome>>>,
}

/// Drives one banner through its lifecycle
#[derive(Clone)]
pub struct BannerLifecycleController {
    inner: Arc<ControllerInner>,
}

impl BannerLifecycleController {
    /// Create a controller in the `Idle` state
    pub fn new(deps: ControllerDeps) -> Self {
        let (state, _) = watch::channel(BannerState::Idle);
        let catalog = VendorListSnapshot::standard(deps.settings.gvl_version);
        Self {
            inner: Arc::new(ControllerInner {
                settings: deps.settings,
                document: deps.document,
                vendor_list: deps.vendor_list,
                stub: deps.stub,
                submission: deps.submission,
                identity_degraded: deps.identity_degraded,
                state,
                history: Mutex::new(vec![BannerState::Idle]),
                bound: Mutex::new(None),
                catalog: Mutex::new(catalog),
                had_prior_decision: AtomicBool::new(false),
                last_activation: Mutex::new(None),
                submission_task: Mutex::new(None),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> BannerState {
        *self.inner.state.borrow()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<BannerState> {
        self.inner.state.subscribe()
    }

    /// Every state entered so far, `Idle` first
    pub fn history(&self) -> Vec<BannerState> {
        lock(&self.inner.history).clone()
    }

    /// Root of the bound banner
    pub fn banner_root(&self) -> Option<ElementHandle> {
        lock(&self.inner.bound).map(|bound| bound.root)
    }

    /// Run until the banner is suppressed or waiting for the visitor
    ///
    /// Never fails: errors become state transitions and log lines.
    pub async fn run(&self) -> BannerState {
        let inner = &self.inner;
        inner.transition(BannerState::AwaitingExistingDecision);

        if inner.check_existing_decision().await {
            return self.state();
        }

        inner.transition(BannerState::Searching);
        let locator = BannerLocator::new(
            Arc::clone(&inner.document),
            inner.settings.banner_element_id.clone(),
            DiscoveryBudget::from(&inner.settings),
        );
        let discovered = match locator.discover().await {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!(error = %e, "Banner discovery failed");
                inner.transition(BannerState::Failed);
                return self.state();
            }
        };
        inner.transition(BannerState::Bound);
        inner.load_catalog().await;

        let bindings = match discovered.fallback {
            Some(fallback) => vec![
                ActionBinding {
                    action: BannerAction::AcceptAll,
                    element: fallback.accept,
                    confidence: BindingConfidence::Marker,
                },
                ActionBinding {
                    action: BannerAction::RejectAll,
                    element: fallback.reject,
                    confidence: BindingConfidence::Marker,
                },
            ],
            None => resolve_actions(&inner.document.descendants(discovered.root)),
        };
        self.bind(discovered.root, &bindings);

        if let Err(e) = inner.document.set_visible(discovered.root, true) {
            warn!(error = %e, "Failed to show banner");
        }
        inner.submission.mark_banner_shown();
        inner.stub.mark_ui_shown();
        inner.transition(BannerState::AwaitingUserChoice);
        self.state()
    }

    /// Activate an action as if its control was clicked
    pub fn activate(&self, action: BannerAction) {
        self.inner.on_activation(action);
    }

    /// Wait for the pending submission, if any, to settle
    pub async fn wait_for_submission(&self) -> Option<SubmissionOutcome> {
        let task = lock(&self.inner.submission_task).take()?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Submission task did not complete");
                None
            }
        }
    }

    fn bind(&self, root: ElementHandle, bindings: &[ActionBinding]) {
        let descendants = self.inner.document.descendants(root);
        let panel = find_preferences_panel(&descendants);
        *lock(&self.inner.bound) = Some(BoundBanner { root, panel });

        if !bindings
            .iter()
            .any(|b| matches!(b.action, BannerAction::AcceptAll | BannerAction::RejectAll))
        {
            warn!(root = %root, "No accept or reject control recognized in banner");
        }

        for binding in bindings {
            let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
            let action = binding.action;
            let handler: ActivationHandler = Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_activation(action);
                }
            });
            match self
                .inner
                .document
                .add_activation_listener(binding.element, handler)
            {
                Ok(()) => debug!(
                    action = %binding.action,
                    element = %binding.element,
                    confidence = ?binding.confidence,
                    "Control bound"
                ),
                Err(e) => warn!(element = %binding.element, error = %e, "Failed to bind control"),
            }
        }
    }
}

impl ControllerInner {
    fn transition(&self, next: BannerState) -> bool {
        let current = *self.state.borrow();
        if !current.can_transition_to(next) {
            debug!(from = %current, to = %next, "Ignoring invalid banner transition");
            return false;
        }
        self.state.send_replace(next);
        lock(&self.history).push(next);
        debug!(from = %current, to = %next, "Banner state changed");
        true
    }

    /// Returns `true` when a valid decision suppressed the banner
    async fn check_existing_decision(&self) -> bool {
        let budget = self.settings.existing_decision_timeout();
        match self.submission.fetch_existing(budget).await {
            ExistingDecision::Found(decision) => {
                let site = self.settings.site();
                let visitor = self.submission.visitor_id();
                if decision.is_valid_for(
                    visitor,
                    &site,
                    Utc::now(),
                    self.settings.decision_max_age_days,
                ) {
                    info!(visitor_id = %visitor, site_id = %site, "Existing decision restored");
                    self.stub.restore_decision(&decision);
                    self.hide_well_known_banner();
                    self.transition(BannerState::Suppressed);
                    return true;
                }
                info!(visitor_id = %visitor, "Stored decision expired or mismatched");
                self.had_prior_decision.store(true, Ordering::Release);
            }
            ExistingDecision::NotFound => debug!("No existing decision"),
            ExistingDecision::Failed(e) => {
                warn!(error = %e, "Existing-decision lookup failed, showing banner");
                if self.identity_degraded {
                    warn!("No storage and no network available");
                    self.transition(BannerState::Failed);
                }
            }
            ExistingDecision::TimedOut => {
                warn!(
                    budget_ms = budget.as_millis(),
                    "Existing-decision lookup timed out, showing banner"
                );
            }
        }
        false
    }

    async fn load_catalog(&self) {
        match self.vendor_list.snapshot().await {
            Ok(snapshot) => *lock(&self.catalog) = snapshot,
            Err(e) => warn!(error = %e, "Vendor list unavailable, using the standard purposes"),
        }
    }

    fn hide_well_known_banner(&self) {
        if let Some(element) = self.document.element_by_id(&self.settings.banner_element_id)
            && let Err(e) = self.document.set_visible(element.handle, false)
        {
            debug!(error = %e, "Failed to hide banner element");
        }
    }

    fn on_activation(self: &Arc<Self>, action: BannerAction) {
        let Some(bound) = *lock(&self.bound) else {
            debug!(%action, "Activation before the banner was bound");
            return;
        };

        let Some(interaction) = action.interaction_type() else {
            match bound.panel {
                Some(panel) => {
                    if let Err(e) = self.document.set_visible(panel, true) {
                        warn!(error = %e, "Failed to reveal preferences panel");
                    }
                }
                None => debug!("Banner has no preferences panel"),
            }
            return;
        };

        let state = *self.state.borrow();
        if state != BannerState::AwaitingUserChoice {
            debug!(%action, %state, "Ignoring activation");
            return;
        }

        {
            let mut last = lock(&self.last_activation);
            let now = Instant::now();
            if let Some(previous) = *last
                && now.duration_since(previous) < self.settings.debounce()
            {
                debug!(%action, "Ignoring repeated activation within debounce window");
                return;
            }
            *last = Some(now);
        }

        // Nothing can be submitted without a runtime; the banner stays up
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%action, "No async runtime available, decision not submitted");
            return;
        };

        if let Err(e) = self.document.set_visible(bound.root, false) {
            warn!(error = %e, "Failed to hide banner");
        }

        let catalog = lock(&self.catalog).clone();
        let choices = match action {
            BannerAction::AcceptAll => ConsentChoices::accept_all(&catalog),
            BannerAction::SavePreferences => {
                read_preferences(&self.document.descendants(bound.root), &catalog)
            }
            BannerAction::RejectAll | BannerAction::ShowPreferences => {
                ConsentChoices::reject_all(&catalog)
            }
        };
        self.transition(BannerState::Submitting);

        let inner = Arc::clone(self);
        let task = runtime.spawn(async move {
            let had_prior = inner.had_prior_decision.load(Ordering::Acquire);
            let report = inner
                .submission
                .submit(interaction, choices.clone(), catalog.version, had_prior)
                .await;
            let tc_string = report.payload.decisions.consent_token.clone().unwrap_or_default();
            inner.stub.record_user_choice(choices, tc_string);
            inner.transition(BannerState::Suppressed);
            report.outcome
        });
        *lock(&self.submission_task) = Some(task);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
