//! Application Ports
//!
//! Service interfaces exposed by this layer to the outer layers. Host and
//! backend ports live in `cmp_domain::ports`.

pub mod services;

pub use services::ConsentLogServiceInterface;
