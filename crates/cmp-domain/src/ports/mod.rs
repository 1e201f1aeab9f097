//! Domain Port Interfaces
//!
//! Boundary contracts between the engine and its host page or backend.
//! High-level code (the application layer) depends on these traits; the
//! providers crate implements them.
//!
//! ## Organization
//!
//! - **storage** - storage tiers backing the visitor identity
//! - **document** - the host page DOM as the engine sees it
//! - **messaging** - cross-frame message posting
//! - **persistence** - client and server views of the decision store
//! - **token** - opaque TC string encoding collaborator
//! - **vendor_list** - read-only vendor list source

/// Host page document port
pub mod document;
/// Cross-frame messaging port
pub mod messaging;
/// Decision persistence ports
pub mod persistence;
/// Key-value storage tier port
pub mod storage;
/// Consent token encoder port
pub mod token;
/// Vendor list source port
pub mod vendor_list;

pub use document::{
    ActivationHandler, ElementHandle, ElementSnapshot, FallbackBanner, FallbackBannerSpec,
    FrameParent, MutationObserver, MutationStream, PageDocument,
};
pub use messaging::{FrameMessenger, FrameRef};
pub use persistence::{ConsentPersistence, ConsentRepository};
pub use storage::KeyValueStore;
pub use token::ConsentTokenEncoder;
pub use vendor_list::VendorListSource;
