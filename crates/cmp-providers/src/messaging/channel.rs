//! Channel Frame Messenger
//!
//! Delivers posted messages to a tokio channel instead of a browser window.
//! The receiving side plays the part of the other frames: the simulator
//! routes replies back through it and tests read them to assert on the
//! exact envelopes.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use cmp_domain::error::{Error, Result};
use cmp_domain::ports::{FrameMessenger, FrameRef};

/// A message posted to a frame
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Destination frame
    pub target: FrameRef,
    /// Message body
    pub message: Value,
}

/// [`FrameMessenger`] backed by an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    sender: mpsc::UnboundedSender<PostedMessage>,
}

impl ChannelMessenger {
    /// Create a messenger and the receiver of everything it posts
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PostedMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl FrameMessenger for ChannelMessenger {
    fn post_message(&self, target: &FrameRef, message: Value) -> Result<()> {
        trace!(target = %target, "Posting frame message");
        self.sender
            .send(PostedMessage {
                target: target.clone(),
                message,
            })
            .map_err(|_| Error::network(format!("frame {target} is no longer listening")))
    }
}
