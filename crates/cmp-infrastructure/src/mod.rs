//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns shared by the `cmp` binary and the
//! persistence service.
//!
//! ## Module Categories
//!
//! ### Configuration & Wiring
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment configuration: defaults, TOML file, `CMP_` environment |
//! | [`bootstrap`] | Builds engine dependencies and the consent log service from configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//!
//! ### Utilities
//! | Module | Description |
//! |--------|-------------|
//! | [`error_ext`] | Context extension for foreign errors |
//! | [`http`] | HTTP client factory |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use bootstrap::{ConsentServiceFactory, EngineFactory};
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
