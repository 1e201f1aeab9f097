//! TCF command API shapes
//!
//! Field names are fixed by the IAB standard so that third-party scanners
//! recognize the implementation; they are reproduced exactly through serde
//! renames.

use super::consent::{PurposeId, VendorId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Commands understood by the stub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcfCommand {
    /// Synchronous status probe
    Ping,
    /// Current TC data, deferred until a decision is known
    GetTcData,
    /// Register a state-change listener
    AddEventListener,
    /// Deregister a state-change listener
    RemoveEventListener,
}

impl TcfCommand {
    /// Parse a wire command name; unknown names yield `None`
    pub fn parse(command: &str) -> Option<Self> {
        match command {
            "ping" => Some(Self::Ping),
            "getTCData" => Some(Self::GetTcData),
            "addEventListener" => Some(Self::AddEventListener),
            "removeEventListener" => Some(Self::RemoveEventListener),
            _ => None,
        }
    }

    /// Wire name of the command
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::GetTcData => "getTCData",
            Self::AddEventListener => "addEventListener",
            Self::RemoveEventListener => "removeEventListener",
        }
    }
}

impl fmt::Display for TcfCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle of a registered event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(pub u32);

impl ListenerId {
    /// Interpret a `removeEventListener` parameter
    pub fn from_parameter(parameter: Option<&Value>) -> Option<Self> {
        parameter
            .and_then(Value::as_u64)
            .and_then(|raw| u32::try_from(raw).ok())
            .map(Self)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `eventStatus` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    /// A stored decision was restored
    #[serde(rename = "tcloaded")]
    TcLoaded,
    /// The banner is visible and no decision exists yet
    #[serde(rename = "cmpuishown")]
    CmpUiShown,
    /// The visitor made a fresh choice
    #[serde(rename = "useractioncomplete")]
    UserActionComplete,
}

/// `cmpStatus` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmpStatus {
    /// Engine is still resolving the visitor's state
    Loading,
    /// Engine is fully initialized
    Loaded,
    /// Engine hit an unrecoverable error
    Error,
}

/// `displayStatus` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    /// Banner is shown
    Visible,
    /// Banner was shown and is now hidden
    Hidden,
    /// Banner will not be shown on this page load
    Disabled,
}

/// Synchronous `ping` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReturn {
    /// Whether GDPR applies to this visitor
    pub gdpr_applies: bool,
    /// Always `true` once the engine answers
    pub cmp_loaded: bool,
    /// Engine status
    pub cmp_status: CmpStatus,
    /// Banner visibility
    pub display_status: DisplayStatus,
    /// Implemented API version
    pub api_version: String,
    /// Registered CMP id
    pub cmp_id: u16,
    /// CMP build version
    pub cmp_version: u16,
    /// Vendor list version in use
    pub gvl_version: u32,
    /// TCF policy version
    pub tcf_policy_version: u8,
}

/// Purpose consent section of [`TcData`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeConsents {
    /// Consent per purpose
    pub consents: BTreeMap<PurposeId, bool>,
}

/// Vendor consent section of [`TcData`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConsents {
    /// Consent per vendor
    pub consents: BTreeMap<VendorId, bool>,
}

/// `getTCData` / event listener payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcData {
    /// Opaque consent token; empty until a decision exists
    pub tc_string: String,
    /// Consent is scoped to this service only
    pub is_service_specific: bool,
    /// Whether GDPR applies to this visitor
    pub gdpr_applies: bool,
    /// Which transition produced this payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_status: Option<EventStatus>,
    /// Engine status
    pub cmp_status: CmpStatus,
    /// Registered CMP id
    pub cmp_id: u16,
    /// CMP build version
    pub cmp_version: u16,
    /// TCF policy version
    pub tcf_policy_version: u8,
    /// Listener the payload is delivered to, for event callbacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_id: Option<ListenerId>,
    /// Publisher country code
    pub publisher_cc: String,
    /// Purpose consents
    pub purpose: PurposeConsents,
    /// Vendor consents
    pub vendor: VendorConsents,
}

/// Inbound cross-frame call body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcfCall {
    /// Command name, kept raw so unknown commands can be answered
    pub command: String,
    /// Requested API major version
    #[serde(default)]
    pub version: Option<Value>,
    /// Command-specific parameter
    #[serde(default)]
    pub parameter: Option<Value>,
    /// Caller correlation id, echoed untouched
    #[serde(default)]
    pub call_id: Value,
}

/// `{ "__tcfapiCall": { .. } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcfCallEnvelope {
    /// Wrapped call
    #[serde(rename = "__tcfapiCall")]
    pub call: TcfCall,
}

/// Outbound cross-frame reply body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcfReturn {
    /// Command result
    pub return_value: Value,
    /// Whether the command succeeded
    pub success: bool,
    /// Correlation id copied from the call
    pub call_id: Value,
}

/// `{ "__tcfapiReturn": { .. } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcfReturnEnvelope {
    /// Wrapped reply
    #[serde(rename = "__tcfapiReturn")]
    pub reply: TcfReturn,
}
