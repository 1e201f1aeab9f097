//! Vendor List Source Port

use crate::error::Result;
use crate::value_objects::VendorListSnapshot;
use async_trait::async_trait;

/// Read-only access to the current vendor list
#[async_trait]
pub trait VendorListSource: Send + Sync {
    /// Current snapshot
    async fn snapshot(&self) -> Result<VendorListSnapshot>;
}
