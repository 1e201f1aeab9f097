//! Static Vendor List
//!
//! Serves a fixed snapshot, either the standard purposes or one loaded from
//! a JSON document exported by the admin side.

use std::path::Path;

use async_trait::async_trait;

use cmp_domain::error::{Error, Result};
use cmp_domain::ports::VendorListSource;
use cmp_domain::value_objects::VendorListSnapshot;

/// [`VendorListSource`] returning one fixed snapshot
#[derive(Debug, Clone)]
pub struct StaticVendorList {
    snapshot: VendorListSnapshot,
}

impl StaticVendorList {
    /// Serve `snapshot`
    pub fn new(snapshot: VendorListSnapshot) -> Self {
        Self { snapshot }
    }

    /// The eleven standard purposes and no vendors
    pub fn standard(version: u32) -> Self {
        Self::new(VendorListSnapshot::standard(version))
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: VendorListSnapshot = serde_json::from_str(json)?;
        if snapshot.purposes.iter().any(|p| p.id == 0) {
            return Err(Error::invalid_argument("purpose ids start at 1"));
        }
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::io_with_source(format!("Failed to read vendor list {}", path.display()), e)
        })?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl VendorListSource for StaticVendorList {
    async fn snapshot(&self) -> Result<VendorListSnapshot> {
        Ok(self.snapshot.clone())
    }
}
