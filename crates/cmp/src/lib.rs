//! # Consent Management Engine
//!
//! An embeddable TCF v2.2 consent engine and the persistence service it
//! talks to.
//!
//! The engine answers the `__tcfapi` command set (directly and across
//! frames), finds or synthesizes the consent banner, binds the visitor's
//! choice and submits it. The service keeps exactly one decision per
//! visitor and site.
//!
//! ## Example
//!
//! ```ignore
//! use cmp::application::ConsentEngine;
//! use cmp::infrastructure::{AppConfig, EngineFactory};
//!
//! let config = AppConfig::default();
//! let deps = EngineFactory::dependencies(&config, document, messenger)?;
//! let engine = ConsentEngine::initialize(deps)?;
//! let state = engine.run().await;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - decision model, TCF types, banner state, port traits
//! - `application` - identity store, command stub, bridge, banner lifecycle, submission
//! - `providers` - storage tiers, virtual document, HTTP persistence, detectors
//! - `infrastructure` - configuration, logging, dependency wiring
//! - `server` - Rocket persistence service

/// Domain layer - decision model and port traits
pub mod domain {
    pub use cmp_domain::*;
}

/// Application layer - the embedded engine
pub mod application {
    pub use cmp_application::*;
}

/// Provider implementations
pub mod providers {
    pub use cmp_providers::*;
}

/// Infrastructure layer - configuration, logging and wiring
pub mod infrastructure {
    pub use cmp_infrastructure::*;
}

/// Server layer - the persistence service
pub mod server {
    pub use cmp_server::*;
}

pub mod cli;
pub mod simulate;

pub use cli::{Cli, Command, run};
pub use domain::{Error, Result};
