//! Read-only vendor list snapshot
//!
//! Owned by the scanning/admin side; the engine only reads it to know which
//! purposes and vendors a blanket accept or reject covers.

use super::consent::{PurposeId, VendorId};
use serde::{Deserialize, Serialize};

/// Catalog entry for a purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeInfo {
    /// Purpose id
    pub id: PurposeId,
    /// Human-readable name
    pub name: String,
}

/// Catalog entry for a vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    /// Vendor id
    pub id: VendorId,
    /// Human-readable name
    pub name: String,
}

/// Snapshot of the vendor list at a given version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorListSnapshot {
    /// Vendor list version
    pub version: u32,
    /// Purpose catalog
    pub purposes: Vec<PurposeInfo>,
    /// Vendor catalog
    #[serde(default)]
    pub vendors: Vec<VendorInfo>,
}

const STANDARD_PURPOSES: [&str; 11] = [
    "Store and/or access information on a device",
    "Use limited data to select advertising",
    "Create profiles for personalised advertising",
    "Use profiles to select personalised advertising",
    "Create profiles to personalise content",
    "Use profiles to select personalised content",
    "Measure advertising performance",
    "Measure content performance",
    "Understand audiences through statistics or combinations of data from different sources",
    "Develop and improve services",
    "Use limited data to select content",
];

impl VendorListSnapshot {
    /// Snapshot holding the eleven standard TCF v2.2 purposes and no vendors
    pub fn standard(version: u32) -> Self {
        let purposes = STANDARD_PURPOSES
            .iter()
            .zip(1..)
            .map(|(name, id)| PurposeInfo {
                id,
                name: (*name).to_string(),
            })
            .collect();
        Self {
            version,
            purposes,
            vendors: Vec::new(),
        }
    }

    /// Add a vendor to the catalog
    pub fn with_vendor(mut self, id: VendorId, name: impl Into<String>) -> Self {
        self.vendors.push(VendorInfo {
            id,
            name: name.into(),
        });
        self
    }

    /// Iterate purpose ids
    pub fn purpose_ids(&self) -> impl Iterator<Item = PurposeId> + '_ {
        self.purposes.iter().map(|p| p.id)
    }

    /// Iterate vendor ids
    pub fn vendor_ids(&self) -> impl Iterator<Item = VendorId> + '_ {
        self.vendors.iter().map(|v| v.id)
    }
}
