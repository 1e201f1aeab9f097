//! Consent Persistence Providers
//!
//! | Provider | Port | Backing |
//! |----------|------|---------|
//! | [`HttpConsentPersistence`] | `ConsentPersistence` | persistence service over HTTP |
//! | [`LocalConsentPersistence`] | `ConsentPersistence` | in-process consent log service |
//! | [`InMemoryConsentRepository`] | `ConsentRepository` | `DashMap` |

pub mod http;
pub mod in_memory;
pub mod local;

pub use http::HttpConsentPersistence;
pub use in_memory::InMemoryConsentRepository;
pub use local::LocalConsentPersistence;
