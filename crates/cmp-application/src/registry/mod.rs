//! Plugin Registry System
//!
//! Compile-time registration of pluggable engine pieces via `linkme`
//! distributed slices. Providers add entries from `cmp-providers`; the
//! engine and the bootstrap code query the slices at runtime.
//!
//! ## Registering a Detector (in cmp-providers)
//!
//! ```ignore
//! use cmp_application::registry::{CMP_DETECTORS, CmpDetectorEntry};
//!
//! #[linkme::distributed_slice(CMP_DETECTORS)]
//! static ONETRUST: CmpDetectorEntry = CmpDetectorEntry {
//!     name: "onetrust",
//!     description: "OneTrust banner container",
//!     predicate: |doc| doc.element_by_id("onetrust-banner-sdk").is_some(),
//!     extractor: |doc| doc.element_by_id("onetrust-banner-sdk").map(|e| e.handle),
//! };
//! ```

pub mod detector;
pub mod storage;

pub use detector::{CMP_DETECTORS, CmpDetectorEntry, DetectorMatch, list_detectors, run_detectors};
pub use storage::{
    KEY_VALUE_STORES, StorageProviderConfig, StorageProviderEntry, list_storage_providers,
    resolve_storage_provider,
};
