//! Cross-Frame Messaging Port

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque reference to a frame (window) able to receive messages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRef(String);

impl FrameRef {
    /// Wrap a host frame reference
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Posts structured messages to other frames, regardless of origin
pub trait FrameMessenger: Send + Sync {
    /// Post `message` to `target`
    fn post_message(&self, target: &FrameRef, message: Value) -> Result<()>;
}
