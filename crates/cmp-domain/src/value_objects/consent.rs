//! Consent decision model
//!
//! A [`ConsentDecision`] is the authoritative record for one
//! `(visitor, site)` pair. Purpose 1 is always granted; purposes that are
//! absent from the map are treated as refused.

use super::identity::{SiteId, VisitorId};
use super::vendor_list::VendorListSnapshot;
use crate::constants::STRICTLY_NECESSARY_PURPOSE;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Standardized numeric processing purpose
pub type PurposeId = u16;

/// Vendor identifier from the global vendor list
pub type VendorId = u32;

/// How the visitor arrived at a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Every purpose and vendor granted
    AcceptAll,
    /// Only strictly necessary storage granted
    RejectAll,
    /// Granular choices from the preferences panel
    SavePreferences,
    /// Banner dismissed without an explicit choice
    Close,
    /// Decision recorded without a banner interaction
    NoInteraction,
}

impl InteractionType {
    /// Wire name of the interaction
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AcceptAll => "accept_all",
            Self::RejectAll => "reject_all",
            Self::SavePreferences => "save_preferences",
            Self::Close => "close",
            Self::NoInteraction => "no_interaction",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose and vendor choices, independent of who made them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentChoices {
    /// Consent per purpose
    #[serde(default)]
    pub purposes: BTreeMap<PurposeId, bool>,
    /// Consent per vendor
    #[serde(default)]
    pub vendors: BTreeMap<VendorId, bool>,
}

impl ConsentChoices {
    /// Build choices from explicit maps, enforcing the purpose 1 invariant
    pub fn new(purposes: BTreeMap<PurposeId, bool>, vendors: BTreeMap<VendorId, bool>) -> Self {
        Self { purposes, vendors }.normalized()
    }

    /// Grant every purpose and vendor of the catalog
    pub fn accept_all(catalog: &VendorListSnapshot) -> Self {
        Self::uniform(catalog, true)
    }

    /// Refuse everything except strictly necessary storage
    pub fn reject_all(catalog: &VendorListSnapshot) -> Self {
        Self::uniform(catalog, false)
    }

    fn uniform(catalog: &VendorListSnapshot, granted: bool) -> Self {
        let purposes = catalog.purpose_ids().map(|id| (id, granted)).collect();
        let vendors = catalog.vendor_ids().map(|id| (id, granted)).collect();
        Self::new(purposes, vendors)
    }

    /// Force purpose 1 to `true`
    pub fn normalized(mut self) -> Self {
        self.purposes.insert(STRICTLY_NECESSARY_PURPOSE, true);
        self
    }

    /// Consent for a purpose; absent purposes are refused
    pub fn purpose(&self, id: PurposeId) -> bool {
        self.purposes.get(&id).copied().unwrap_or(false)
    }

    /// Consent for a vendor; absent vendors are refused
    pub fn vendor(&self, id: VendorId) -> bool {
        self.vendors.get(&id).copied().unwrap_or(false)
    }
}

/// Authoritative decision for a `(visitor, site)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDecision {
    /// Visitor the decision belongs to
    pub visitor_id: VisitorId,
    /// Site the decision belongs to
    pub site_id: SiteId,
    /// Consent per purpose
    pub purposes: BTreeMap<PurposeId, bool>,
    /// Consent per vendor
    #[serde(default)]
    pub vendors: BTreeMap<VendorId, bool>,
    /// Opaque TC string produced by the token encoder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_token: Option<String>,
    /// Interaction that produced the decision
    pub interaction_type: InteractionType,
    /// When the decision was recorded
    pub created_at: DateTime<Utc>,
}

impl ConsentDecision {
    /// Create a decision stamped now, enforcing the purpose 1 invariant
    pub fn new(
        visitor_id: VisitorId,
        site_id: SiteId,
        choices: ConsentChoices,
        consent_token: Option<String>,
        interaction_type: InteractionType,
    ) -> Self {
        let choices = choices.normalized();
        Self {
            visitor_id,
            site_id,
            purposes: choices.purposes,
            vendors: choices.vendors,
            consent_token,
            interaction_type,
            created_at: Utc::now(),
        }
    }

    /// Copy of the purpose and vendor maps
    pub fn choices(&self) -> ConsentChoices {
        ConsentChoices {
            purposes: self.purposes.clone(),
            vendors: self.vendors.clone(),
        }
    }

    /// Whether the decision is older than the allowed age
    pub fn is_expired(&self, now: DateTime<Utc>, max_age_days: u32) -> bool {
        now - self.created_at > Duration::days(i64::from(max_age_days))
    }

    /// Whether the decision may suppress the banner
    ///
    /// A decision read back for a different visitor or site, or one that has
    /// lost its purpose 1 grant, is treated as absent.
    pub fn is_valid_for(
        &self,
        visitor: &VisitorId,
        site: &SiteId,
        now: DateTime<Utc>,
        max_age_days: u32,
    ) -> bool {
        &self.visitor_id == visitor
            && &self.site_id == site
            && self.purposes.get(&STRICTLY_NECESSARY_PURPOSE) == Some(&true)
            && !self.is_expired(now, max_age_days)
    }
}
