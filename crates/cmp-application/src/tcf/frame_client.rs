//! Remote TCF caller
//!
//! Used by code running in a frame that has no direct reference to the
//! stub: calls are posted as `__tcfapiCall` envelopes towards the frame that
//! owns the locator, and replies are matched back by `callId`.

use super::bridge::decode_envelope;
use cmp_domain::constants::{TCF_CALL_ENVELOPE_KEY, TCF_RETURN_ENVELOPE_KEY};
use cmp_domain::ports::{FrameMessenger, FrameRef};
use cmp_domain::value_objects::{TcfCall, TcfCallEnvelope, TcfReturn, TcfReturnEnvelope};
use cmp_domain::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum PendingReply {
    Once(oneshot::Sender<TcfReturn>),
    Stream(mpsc::UnboundedSender<TcfReturn>),
}

/// Caller side of the cross-frame protocol
pub struct TcfFrameClient {
    messenger: Arc<dyn FrameMessenger>,
    target: FrameRef,
    prefix: String,
    next_call: AtomicU64,
    pending: Mutex<HashMap<String, PendingReply>>,
}

impl TcfFrameClient {
    /// Create a client posting to `target`
    ///
    /// `prefix` namespaces the generated call ids so several clients can
    /// share one messaging channel.
    pub fn new(
        messenger: Arc<dyn FrameMessenger>,
        target: FrameRef,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            target,
            prefix: prefix.into(),
            next_call: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Send a command and wait for its single reply
    pub async fn call(
        &self,
        command: &str,
        version: Option<u32>,
        parameter: Option<Value>,
    ) -> Result<TcfReturn> {
        let (tx, rx) = oneshot::channel();
        let call_id = self.register(PendingReply::Once(tx));
        self.post(command, version, parameter, &call_id)?;
        rx.await
            .map_err(|_| Error::internal(format!("reply channel for call {call_id} closed")))
    }

    /// Register a remote event listener
    ///
    /// Every reply carrying the registration's `callId` is forwarded to the
    /// returned receiver, the immediate one included.
    pub fn subscribe(&self, version: Option<u32>) -> Result<mpsc::UnboundedReceiver<TcfReturn>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let call_id = self.register(PendingReply::Stream(tx));
        self.post("addEventListener", version, None, &call_id)?;
        Ok(rx)
    }

    /// Number of calls still waiting for a reply
    pub fn pending_calls(&self) -> usize {
        self.lock().len()
    }

    /// Route one inbound message to its waiting caller
    ///
    /// Returns `false` when the message is not a reply envelope or carries
    /// an unknown `callId`.
    pub fn handle_reply(&self, data: &Value) -> bool {
        let Some((envelope, _)) = decode_envelope(data, TCF_RETURN_ENVELOPE_KEY) else {
            return false;
        };
        let reply = match serde_json::from_value::<TcfReturnEnvelope>(envelope) {
            Ok(envelope) => envelope.reply,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed TCF reply");
                return false;
            }
        };

        let key = call_key(&reply.call_id);
        let mut pending = self.lock();
        match pending.remove(&key) {
            Some(PendingReply::Once(tx)) => {
                drop(pending);
                // The caller may have stopped waiting; nothing to do then
                let _ = tx.send(reply);
                true
            }
            Some(PendingReply::Stream(tx)) => {
                if tx.send(reply).is_ok() {
                    pending.insert(key, PendingReply::Stream(tx));
                } else {
                    debug!(call_id = %key, "Listener receiver dropped");
                }
                true
            }
            None => {
                debug!(call_id = %key, "Reply for unknown call");
                false
            }
        }
    }

    fn register(&self, reply: PendingReply) -> String {
        let n = self.next_call.fetch_add(1, Ordering::Relaxed) + 1;
        let call_id = format!("{}-{n}", self.prefix);
        self.lock().insert(call_id.clone(), reply);
        call_id
    }

    fn post(
        &self,
        command: &str,
        version: Option<u32>,
        parameter: Option<Value>,
        call_id: &str,
    ) -> Result<()> {
        let envelope = TcfCallEnvelope {
            call: TcfCall {
                command: command.to_string(),
                version: version.map(Value::from),
                parameter,
                call_id: Value::String(call_id.to_string()),
            },
        };
        let result = serde_json::to_value(envelope)
            .map_err(Error::from)
            .and_then(|message| self.messenger.post_message(&self.target, message));
        if let Err(e) = &result {
            warn!(call_id, key = TCF_CALL_ENVELOPE_KEY, error = %e, "Failed to post TCF call");
            self.lock().remove(call_id);
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingReply>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn call_key(call_id: &Value) -> String {
    match call_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
