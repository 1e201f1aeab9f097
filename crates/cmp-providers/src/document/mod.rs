//! Page Document Providers
//!
//! Implementations of the `PageDocument` port.

pub mod virtual_document;

pub use virtual_document::{ElementSpec, VirtualDocument};
