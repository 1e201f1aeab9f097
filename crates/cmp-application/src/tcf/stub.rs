//! TCF Command Stub
//!
//! In-page implementation of the standardized command set. All commands go
//! through [`CommandStub::call`]; replies are delivered through the caller's
//! callback as `(return_value, success)`.
//!
//! The stub never panics into the caller: unknown commands and unsupported
//! versions call back with `success = false`, and a panicking callback is
//! caught and logged.

use cmp_domain::constants::{TCF_API_VERSION, TCF_MAX_COMMAND_VERSION, TCF_POLICY_VERSION};
use cmp_domain::value_objects::{
    CmpStatus, ConsentChoices, ConsentDecision, DisplayStatus, EngineSettings, EventStatus,
    ListenerId, PingReturn, PurposeConsents, TcData, TcfCommand, VendorConsents, VendorId,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Caller-supplied reply callback: `(return_value, success)`
pub type TcfCallback = Arc<dyn Fn(Value, bool) + Send + Sync>;

/// Values reported in `ping` and `getTCData` replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubIdentity {
    /// Registered CMP id
    pub cmp_id: u16,
    /// CMP build version
    pub cmp_version: u16,
    /// Vendor list version
    pub gvl_version: u32,
    /// Whether GDPR applies
    pub gdpr_applies: bool,
    /// Publisher country code
    pub publisher_cc: String,
}

impl From<&EngineSettings> for StubIdentity {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            cmp_id: settings.cmp_id,
            cmp_version: settings.cmp_version,
            gvl_version: settings.gvl_version,
            gdpr_applies: settings.gdpr_applies,
            publisher_cc: settings.publisher_cc.clone(),
        }
    }
}

struct PendingTcData {
    callback: TcfCallback,
    vendor_filter: Option<Vec<VendorId>>,
}

struct StubState {
    display_status: DisplayStatus,
    event_status: Option<EventStatus>,
    choices: ConsentChoices,
    tc_string: String,
    listeners: BTreeMap<ListenerId, TcfCallback>,
    pending: Vec<PendingTcData>,
    next_listener: u32,
}

/// Deliveries computed under the lock and performed after releasing it
type Deliveries = Vec<(TcfCallback, Value, bool)>;

/// The in-page command stub
pub struct CommandStub {
    identity: StubIdentity,
    state: Mutex<StubState>,
}

impl CommandStub {
    /// Create a stub with no decision known yet
    pub fn new(identity: StubIdentity) -> Self {
        Self {
            identity,
            state: Mutex::new(StubState {
                display_status: DisplayStatus::Hidden,
                event_status: None,
                choices: ConsentChoices::default(),
                tc_string: String::new(),
                listeners: BTreeMap::new(),
                pending: Vec::new(),
                next_listener: 0,
            }),
        }
    }

    /// Dispatch one command
    ///
    /// `version` of `None` or `0` means the latest supported version.
    /// Returns the allocated listener id for `addEventListener`.
    pub fn call(
        &self,
        command: &str,
        version: Option<u32>,
        callback: TcfCallback,
        parameter: Option<&Value>,
    ) -> Option<ListenerId> {
        if let Some(version) = version
            && version != 0
            && version != TCF_MAX_COMMAND_VERSION
        {
            debug!(command, version, "Unsupported command version");
            deliver(vec![(callback, Value::Null, false)]);
            return None;
        }

        let Some(command) = TcfCommand::parse(command) else {
            debug!(command, "Unknown TCF command");
            deliver(vec![(callback, Value::Null, false)]);
            return None;
        };

        match command {
            TcfCommand::Ping => {
                let reply = to_value(&self.ping());
                deliver(vec![(callback, reply, true)]);
                None
            }
            TcfCommand::GetTcData => {
                self.get_tc_data(callback, parameter);
                None
            }
            TcfCommand::AddEventListener => Some(self.add_event_listener(callback)),
            TcfCommand::RemoveEventListener => {
                let removed = ListenerId::from_parameter(parameter)
                    .is_some_and(|id| self.remove_event_listener(id));
                deliver(vec![(callback, Value::Bool(removed), true)]);
                None
            }
        }
    }

    /// Current `ping` reply
    pub fn ping(&self) -> PingReturn {
        let display_status = self.lock().display_status;
        PingReturn {
            gdpr_applies: self.identity.gdpr_applies,
            cmp_loaded: true,
            cmp_status: CmpStatus::Loaded,
            display_status,
            api_version: TCF_API_VERSION.to_string(),
            cmp_id: self.identity.cmp_id,
            cmp_version: self.identity.cmp_version,
            gvl_version: self.identity.gvl_version,
            tcf_policy_version: TCF_POLICY_VERSION,
        }
    }

    /// Current event status, `None` while the engine is still resolving
    pub fn event_status(&self) -> Option<EventStatus> {
        self.lock().event_status
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Register a listener and fire it once with the current state
    pub fn add_event_listener(&self, callback: TcfCallback) -> ListenerId {
        let (id, reply) = {
            let mut state = self.lock();
            state.next_listener += 1;
            let id = ListenerId(state.next_listener);
            state.listeners.insert(id, Arc::clone(&callback));
            (id, self.tc_data(&state, Some(id), None))
        };
        debug!(listener_id = %id, "Event listener registered");
        deliver(vec![(callback, reply, true)]);
        id
    }

    /// Deregister a listener; unknown ids are a no-op
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let removed = self.lock().listeners.remove(&id).is_some();
        if removed {
            debug!(listener_id = %id, "Event listener removed");
        } else {
            debug!(listener_id = %id, "Ignoring removal of unknown listener");
        }
        removed
    }

    /// The banner became visible and no decision exists yet
    pub fn mark_ui_shown(&self) {
        self.transition(EventStatus::CmpUiShown, DisplayStatus::Visible, None);
    }

    /// A stored decision was restored; the banner stays disabled
    pub fn restore_decision(&self, decision: &ConsentDecision) {
        self.transition(
            EventStatus::TcLoaded,
            DisplayStatus::Disabled,
            Some((
                decision.choices(),
                decision.consent_token.clone().unwrap_or_default(),
            )),
        );
    }

    /// The visitor made a fresh choice
    pub fn record_user_choice(&self, choices: ConsentChoices, tc_string: String) {
        self.transition(
            EventStatus::UserActionComplete,
            DisplayStatus::Hidden,
            Some((choices, tc_string)),
        );
    }

    fn get_tc_data(&self, callback: TcfCallback, parameter: Option<&Value>) {
        let vendor_filter = parameter.and_then(vendor_filter);
        let reply = {
            let mut state = self.lock();
            if state.event_status.is_none() {
                state.pending.push(PendingTcData {
                    callback,
                    vendor_filter,
                });
                debug!("getTCData queued until the decision is resolved");
                return;
            }
            self.tc_data(&state, None, vendor_filter.as_deref())
        };
        deliver(vec![(callback, reply, true)]);
    }

    fn transition(
        &self,
        event: EventStatus,
        display: DisplayStatus,
        decision: Option<(ConsentChoices, String)>,
    ) {
        let deliveries = {
            let mut state = self.lock();
            state.event_status = Some(event);
            state.display_status = display;
            if let Some((choices, tc_string)) = decision {
                state.choices = choices.normalized();
                state.tc_string = tc_string;
            }

            let mut deliveries: Deliveries = state
                .listeners
                .iter()
                .map(|(id, callback)| {
                    (
                        Arc::clone(callback),
                        self.tc_data(&state, Some(*id), None),
                        true,
                    )
                })
                .collect();

            let pending = std::mem::take(&mut state.pending);
            deliveries.extend(pending.into_iter().map(|request| {
                let reply = self.tc_data(&state, None, request.vendor_filter.as_deref());
                (request.callback, reply, true)
            }));
            deliveries
        };

        debug!(event_status = ?event, callbacks = deliveries.len(), "TC data transition");
        deliver(deliveries);
    }

    fn tc_data(
        &self,
        state: &StubState,
        listener_id: Option<ListenerId>,
        vendor_filter: Option<&[VendorId]>,
    ) -> Value {
        let vendors = match vendor_filter {
            Some(ids) => ids
                .iter()
                .map(|id| (*id, state.choices.vendor(*id)))
                .collect(),
            None => state.choices.vendors.clone(),
        };
        to_value(&TcData {
            tc_string: state.tc_string.clone(),
            is_service_specific: true,
            gdpr_applies: self.identity.gdpr_applies,
            event_status: state.event_status,
            cmp_status: CmpStatus::Loaded,
            cmp_id: self.identity.cmp_id,
            cmp_version: self.identity.cmp_version,
            tcf_policy_version: TCF_POLICY_VERSION,
            listener_id,
            publisher_cc: self.identity.publisher_cc.clone(),
            purpose: PurposeConsents {
                consents: state.choices.purposes.clone(),
            },
            vendor: VendorConsents { consents: vendors },
        })
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Vendor ids requested through the `getTCData` parameter
fn vendor_filter(parameter: &Value) -> Option<Vec<VendorId>> {
    let ids = parameter.as_array()?;
    Some(
        ids.iter()
            .filter_map(Value::as_u64)
            .filter_map(|id| VendorId::try_from(id).ok())
            .collect(),
    )
}

fn to_value<T: serde::Serialize>(reply: &T) -> Value {
    serde_json::to_value(reply).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize TCF reply");
        Value::Null
    })
}

/// Invoke callbacks outside any lock, containing panics
fn deliver(deliveries: Deliveries) {
    for (callback, value, success) in deliveries {
        if catch_unwind(AssertUnwindSafe(|| callback(value, success))).is_err() {
            warn!("TCF callback panicked; ignoring");
        }
    }
}
