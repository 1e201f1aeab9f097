//! # Consent Engine - Provider Implementations
//!
//! Implementations of the ports defined in `cmp-domain`, plus the built-in
//! entries of the application registries.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Storage | `KeyValueStore` | InMemory, File, CookieString |
//! | Document | `PageDocument` | VirtualDocument |
//! | Messaging | `FrameMessenger` | ChannelMessenger |
//! | Persistence | `ConsentPersistence` | Http, Local |
//! | Repository | `ConsentRepository` | InMemory |
//! | Token | `ConsentTokenEncoder` | Compact |
//! | Vendor List | `VendorListSource` | Static |
//! | Detectors | `CMP_DETECTORS` registry | cookiebot, cookieyes, didomi, onetrust, quantcast, usercentrics |
//!
//! ## Usage
//!
//! ```ignore
//! use cmp_providers::document::VirtualDocument;
//! use cmp_providers::storage::InMemoryKeyValueStore;
//! use cmp_providers::persistence::HttpConsentPersistence;
//! ```

// Re-export cmp-domain types commonly used with providers
pub use cmp_domain::error::{Error, Result};
pub use cmp_domain::ports::{
    ConsentPersistence, ConsentRepository, ConsentTokenEncoder, FrameMessenger, KeyValueStore,
    PageDocument, VendorListSource,
};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// Key-value storage tiers
///
/// Implements `KeyValueStore` for the identity store's tiers.
pub mod storage;

/// Page document implementations
pub mod document;

/// Frame messenger implementations
pub mod messaging;

/// Consent persistence clients and repositories
pub mod persistence;

/// Consent token encoders
pub mod token;

/// Vendor list sources
pub mod vendor_list;

/// Built-in third-party CMP detectors
pub mod detectors;

// Re-export commonly used providers
pub use document::{ElementSpec, VirtualDocument};
pub use messaging::{ChannelMessenger, PostedMessage};
pub use persistence::{HttpConsentPersistence, InMemoryConsentRepository, LocalConsentPersistence};
pub use storage::{CookieStringStore, FileKeyValueStore, InMemoryKeyValueStore};
pub use token::CompactTokenEncoder;
pub use vendor_list::StaticVendorList;
