//! Decision submission payload
//!
//! Body of `POST /consent/{siteId}`. The rich UI interaction survives only in
//! [`BannerInteraction`]; the backend itself sees a [`BackendOperation`].

use super::consent::{ConsentChoices, InteractionType, PurposeId, VendorId};
use super::identity::VisitorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical operation from the backend's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendOperation {
    /// First decision recorded for this visitor and site
    Grant,
    /// Replaces an earlier decision
    Update,
}

impl BackendOperation {
    /// Map a UI interaction to the backend vocabulary
    ///
    /// Accept and reject are both plain writes; only whether a decision
    /// already existed changes the operation.
    pub fn for_interaction(_interaction: InteractionType, had_prior_decision: bool) -> Self {
        if had_prior_decision {
            Self::Update
        } else {
            Self::Grant
        }
    }
}

/// Coarse device class derived from the user agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Phones
    Mobile,
    /// Tablets
    Tablet,
    /// Everything else
    Desktop,
}

impl DeviceType {
    /// Classify a user agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("ipad")
            || ua.contains("tablet")
            || (ua.contains("android") && !ua.contains("mobile"))
        {
            Self::Tablet
        } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("android") {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Analytics view of the interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInteraction {
    /// UI-level interaction
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    /// Milliseconds between the banner being shown and the choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_decision: Option<u64>,
}

/// Optional client metadata, dropped from reduced payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// Browser user agent
    pub user_agent: String,
    /// Browser language
    pub language: String,
    /// Derived device class
    pub device_type: DeviceType,
}

impl ClientMetadata {
    /// Build metadata from the host's user agent and language
    pub fn new(user_agent: impl Into<String>, language: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        let device_type = DeviceType::from_user_agent(&user_agent);
        Self {
            user_agent,
            language: language.into(),
            device_type,
        }
    }
}

/// The decision part of the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSet {
    /// Consent per purpose
    pub purposes: BTreeMap<PurposeId, bool>,
    /// Consent per vendor
    #[serde(default)]
    pub vendors: BTreeMap<VendorId, bool>,
    /// Opaque TC string, when the client encoded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_token: Option<String>,
    /// Backend operation
    pub operation: BackendOperation,
}

impl DecisionSet {
    /// Build from choices, enforcing the purpose 1 invariant
    pub fn new(
        choices: ConsentChoices,
        consent_token: Option<String>,
        operation: BackendOperation,
    ) -> Self {
        let choices = choices.normalized();
        Self {
            purposes: choices.purposes,
            vendors: choices.vendors,
            consent_token,
            operation,
        }
    }

    /// Copy of the purpose and vendor maps
    pub fn choices(&self) -> ConsentChoices {
        ConsentChoices {
            purposes: self.purposes.clone(),
            vendors: self.vendors.clone(),
        }
    }
}

/// Full `POST /consent/{siteId}` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Visitor making the decision
    pub visitor_id: VisitorId,
    /// Decision contents
    pub decisions: DecisionSet,
    /// Interaction details
    pub banner_interaction: BannerInteraction,
    /// Client metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClientMetadata>,
}

impl SubmissionPayload {
    /// Minimal variant used for the size-related retry
    pub fn reduced(&self) -> Self {
        Self {
            visitor_id: self.visitor_id.clone(),
            decisions: self.decisions.clone(),
            banner_interaction: BannerInteraction {
                interaction_type: self.banner_interaction.interaction_type,
                time_to_decision: None,
            },
            metadata: None,
        }
    }
}
