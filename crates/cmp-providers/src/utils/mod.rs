//! Provider Utilities
//!
//! Shared utilities used by provider implementations.

mod http_response;

pub use http_response::{ApiEnvelope, HttpResponseUtils};
