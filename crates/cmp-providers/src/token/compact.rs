//! Compact Consent Token Encoder
//!
//! Produces an opaque, deterministic token from a set of choices. This is
//! not the IAB bit layout; it only has to be stable for identical input and
//! distinct for distinct input.
//!
//! Layout before encoding: `{version}|{granted purposes}|{granted vendors}`,
//! ids comma-separated and ascending, then URL-safe base64 without padding,
//! prefixed with `cmp1.`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use cmp_domain::error::Result;
use cmp_domain::ports::ConsentTokenEncoder;
use cmp_domain::value_objects::ConsentChoices;

use crate::constants::COMPACT_TOKEN_PREFIX;

/// Deterministic base64 token encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactTokenEncoder;

impl CompactTokenEncoder {
    /// Create the encoder
    pub fn new() -> Self {
        Self
    }
}

fn granted<K: Copy + ToString>(map: &std::collections::BTreeMap<K, bool>) -> String {
    map.iter()
        .filter(|(_, granted)| **granted)
        .map(|(id, _)| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl ConsentTokenEncoder for CompactTokenEncoder {
    fn encode(&self, choices: &ConsentChoices, vendor_list_version: u32) -> Result<String> {
        let raw = format!(
            "{vendor_list_version}|{}|{}",
            granted(&choices.purposes),
            granted(&choices.vendors)
        );
        Ok(format!("{COMPACT_TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(raw)))
    }

    fn encoder_name(&self) -> &str {
        "compact"
    }
}
