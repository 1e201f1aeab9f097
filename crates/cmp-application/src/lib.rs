//! Application Layer - Consent Engine
//!
//! Orchestrates the domain types into the embedded consent engine and the
//! server-side consent logging use case.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`use_cases`] | Identity store, submission client, consent log service |
//! | [`tcf`] | Command stub, cross-frame bridge, remote frame client |
//! | [`banner`] | Discovery, action resolution, lifecycle controller |
//! | [`registry`] | `linkme` registries for CMP detectors and storage tiers |
//! | [`engine`] | The per-document engine context |
//!
//! ## Dependencies
//!
//! This crate depends only on `cmp-domain` and pure Rust libraries. Host
//! and backend implementations live in `cmp-providers`.

pub mod banner;
pub mod engine;
pub mod ports;
pub mod registry;
pub mod tcf;
pub mod use_cases;

pub use engine::{ConsentEngine, EngineDependencies};
pub use ports::*;
pub use use_cases::*;
