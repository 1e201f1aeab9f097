//! Built-in Third-party CMP Detectors
//!
//! Each detector registers itself in the `CMP_DETECTORS` slice; linking
//! this crate is enough to make them available to discovery.

pub mod builtin;
