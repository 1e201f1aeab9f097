//! Cross-Frame Bridge
//!
//! Makes the command stub reachable from other frames: a hidden, named
//! locator frame signals that the API exists, and `__tcfapiCall` envelopes
//! received on the messaging channel are relayed to the stub. Replies go
//! back to the sender as `__tcfapiReturn` with the `callId` echoed
//! untouched.
//!
//! Any frame may call any command; there is no authentication.

use super::stub::{CommandStub, TcfCallback};
use cmp_domain::constants::{TCF_CALL_ENVELOPE_KEY, TCF_LOCATOR_FRAME_NAME};
use cmp_domain::ports::{FrameMessenger, FrameParent, FrameRef, PageDocument};
use cmp_domain::value_objects::{TcfCallEnvelope, TcfReturn, TcfReturnEnvelope};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of a locator frame installation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorInstall {
    /// Another script already created the frame
    AlreadyPresent,
    /// Attached to the document body
    Body,
    /// Body not parsed yet; attached to the head instead
    Head,
    /// Neither parent exists yet; a delayed retry is needed
    Deferred,
}

/// How an envelope was encoded by its sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeEncoding {
    /// Structured-clone object
    Object,
    /// JSON text
    Text,
}

impl EnvelopeEncoding {
    /// Encode a value the way the sender encoded its request
    pub fn encode(self, value: Value) -> Value {
        match self {
            Self::Object => value,
            Self::Text => Value::String(value.to_string()),
        }
    }
}

/// Decode a possibly string-encoded envelope
///
/// Returns the object and how it was encoded, or `None` when the message
/// does not carry `key`.
pub fn decode_envelope(data: &Value, key: &str) -> Option<(Value, EnvelopeEncoding)> {
    match data {
        Value::Object(map) if map.contains_key(key) => {
            Some((data.clone(), EnvelopeEncoding::Object))
        }
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(text).ok()?;
            parsed
                .get(key)
                .is_some()
                .then_some((parsed, EnvelopeEncoding::Text))
        }
        _ => None,
    }
}

/// Relay between the messaging channel and the command stub
pub struct CrossFrameBridge {
    stub: Arc<CommandStub>,
    document: Arc<dyn PageDocument>,
    messenger: Arc<dyn FrameMessenger>,
}

impl CrossFrameBridge {
    /// Create a bridge for the given stub and host
    pub fn new(
        stub: Arc<CommandStub>,
        document: Arc<dyn PageDocument>,
        messenger: Arc<dyn FrameMessenger>,
    ) -> Self {
        Self {
            stub,
            document,
            messenger,
        }
    }

    /// Create the locator frame, preferring the body, then the head
    pub fn install_locator(&self) -> LocatorInstall {
        if self.document.has_frame(TCF_LOCATOR_FRAME_NAME) {
            debug!("Locator frame already present");
            return LocatorInstall::AlreadyPresent;
        }

        for (parent, outcome) in [
            (FrameParent::Body, LocatorInstall::Body),
            (FrameParent::Head, LocatorInstall::Head),
        ] {
            match self.document.attach_frame(parent, TCF_LOCATOR_FRAME_NAME) {
                Ok(()) => {
                    debug!(?parent, "Locator frame attached");
                    return outcome;
                }
                Err(e) => debug!(?parent, error = %e, "Locator frame parent unavailable"),
            }
        }
        LocatorInstall::Deferred
    }

    /// Retry installation with a fixed delay until it succeeds
    ///
    /// Returns the last outcome; `Deferred` means every attempt failed.
    pub async fn install_locator_with_retry(
        &self,
        max_attempts: u32,
        delay: Duration,
    ) -> LocatorInstall {
        let mut outcome = self.install_locator();
        let mut attempt = 1;
        while outcome == LocatorInstall::Deferred && attempt < max_attempts {
            tokio::time::sleep(delay).await;
            attempt += 1;
            outcome = self.install_locator();
        }
        if outcome == LocatorInstall::Deferred {
            warn!(attempts = attempt, "Locator frame could not be attached");
        } else {
            info!(?outcome, "Locator frame ready");
        }
        outcome
    }

    /// Handle one inbound message
    ///
    /// Returns `false` when the message is not a TCF call envelope.
    pub fn handle_message(&self, source: &FrameRef, data: &Value) -> bool {
        let Some((envelope, encoding)) = decode_envelope(data, TCF_CALL_ENVELOPE_KEY) else {
            return false;
        };

        let call = match serde_json::from_value::<TcfCallEnvelope>(envelope.clone()) {
            Ok(parsed) => parsed.call,
            Err(e) => {
                let call_id = envelope
                    .get(TCF_CALL_ENVELOPE_KEY)
                    .and_then(|call| call.get("callId"))
                    .cloned()
                    .unwrap_or(Value::Null);
                debug!(error = %e, %call_id, "Malformed TCF call envelope");
                self.post_reply(
                    source,
                    encoding,
                    TcfReturn {
                        return_value: Value::Null,
                        success: false,
                        call_id,
                    },
                );
                return true;
            }
        };

        debug!(
            command = %call.command,
            call_id = %call.call_id,
            source = %source,
            "Relaying TCF call"
        );

        let messenger = Arc::clone(&self.messenger);
        let target = source.clone();
        let call_id = call.call_id.clone();
        let callback: TcfCallback = Arc::new(move |return_value, success| {
            send_reply(
                messenger.as_ref(),
                &target,
                encoding,
                TcfReturn {
                    return_value,
                    success,
                    call_id: call_id.clone(),
                },
            );
        });

        self.stub.call(
            &call.command,
            parse_version(call.version.as_ref()),
            callback,
            call.parameter.as_ref(),
        );
        true
    }

    fn post_reply(&self, target: &FrameRef, encoding: EnvelopeEncoding, reply: TcfReturn) {
        send_reply(self.messenger.as_ref(), target, encoding, reply);
    }
}

fn send_reply(
    messenger: &dyn FrameMessenger,
    target: &FrameRef,
    encoding: EnvelopeEncoding,
    reply: TcfReturn,
) {
    let envelope = match serde_json::to_value(TcfReturnEnvelope { reply }) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to serialize TCF reply envelope");
            return;
        }
    };
    if let Err(e) = messenger.post_message(target, encoding.encode(envelope)) {
        warn!(target = %target, error = %e, "Failed to post TCF reply");
    }
}

/// Interpret the envelope's `version` field
///
/// Missing or null means latest; anything that is not a small non-negative
/// integer maps to an unsupported version.
fn parse_version(version: Option<&Value>) -> Option<u32> {
    match version? {
        Value::Null => None,
        Value::Number(n) => Some(
            n.as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(u32::MAX),
        ),
        Value::String(s) => Some(s.trim().parse().unwrap_or(u32::MAX)),
        _ => Some(u32::MAX),
    }
}
