//! Consent Token Encoder Port
//!
//! The TC string bit layout is owned by an external collaborator; the engine
//! and the service only need something that turns choices into an opaque,
//! deterministic token.

use crate::error::Result;
use crate::value_objects::ConsentChoices;

/// Produces the opaque consent token for a set of choices
pub trait ConsentTokenEncoder: Send + Sync {
    /// Encode choices made against the given vendor list version
    fn encode(&self, choices: &ConsentChoices, vendor_list_version: u32) -> Result<String>;

    /// Encoder name used in logs
    fn encoder_name(&self) -> &str;
}
