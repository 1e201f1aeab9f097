//! # Consent Engine Domain
//!
//! Core types shared by the embedded consent engine and the persistence
//! service: the decision model, the TCF command and envelope shapes, the
//! banner state machine vocabulary, and the port traits the host page and
//! backend implement.
//!
//! Nothing in this crate performs I/O.

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
