//! Host Page Document Port
//!
//! The engine runs inside a page it does not control. Everything it needs
//! from the DOM goes through [`PageDocument`]: element snapshots for the
//! discovery heuristics, visibility toggling, activation listeners, mutation
//! observation, locator-frame attachment and the per-document re-entry guard.

use crate::error::Result;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// Opaque handle to an element of the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point-in-time view of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Element handle
    pub handle: ElementHandle,
    /// Lowercase tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// `class` list
    pub classes: Vec<String>,
    /// Visible text content, descendants included
    pub text: String,
    /// Remaining attributes
    pub attributes: BTreeMap<String, String>,
    /// Whether the element is rendered
    pub visible: bool,
    /// Checkbox state, for checkable inputs
    pub checked: Option<bool>,
    /// Parent element
    pub parent: Option<ElementHandle>,
}

impl ElementSnapshot {
    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the element carries the class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// `id` and classes joined, lowercased, for naming heuristics
    pub fn naming(&self) -> String {
        let mut naming = self.id.clone().unwrap_or_default();
        for class in &self.classes {
            naming.push(' ');
            naming.push_str(class);
        }
        naming.to_ascii_lowercase()
    }

    /// Lowercased words of the `id` and classes, split on `-`, `_` and spaces
    pub fn naming_tokens(&self) -> Vec<String> {
        self.naming()
            .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether a visitor can activate the element
    pub fn is_control(&self) -> bool {
        match self.tag.as_str() {
            "button" | "a" => true,
            "input" => matches!(self.attribute("type"), Some("button" | "submit")),
            _ => self.attribute("role") == Some("button"),
        }
    }
}

/// Where to attach the locator frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameParent {
    /// Document body
    Body,
    /// Document head, used while the body is not parsed yet
    Head,
}

/// What to synthesize when no banner exists on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackBannerSpec {
    /// id of the root element
    pub element_id: String,
    /// Banner message
    pub message: String,
    /// Accept button label
    pub accept_label: String,
    /// Reject button label
    pub reject_label: String,
}

impl Default for FallbackBannerSpec {
    fn default() -> Self {
        Self {
            element_id: crate::constants::WELL_KNOWN_BANNER_ID.to_string(),
            message: "We use cookies and similar technologies. You can accept or reject their use."
                .to_string(),
            accept_label: "Accept all".to_string(),
            reject_label: "Reject all".to_string(),
        }
    }
}

/// Handles of a synthesized banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackBanner {
    /// Root element
    pub root: ElementHandle,
    /// Accept control
    pub accept: ElementHandle,
    /// Reject control
    pub reject: ElementHandle,
}

/// Callback invoked when a bound control is activated
pub type ActivationHandler = Arc<dyn Fn() + Send + Sync>;

/// Stream of "the DOM changed" notifications
pub type MutationStream = Pin<Box<dyn Stream<Item = ()> + Send>>;

/// A live mutation subscription
///
/// Must be disconnected once discovery completes; dropping it disconnects
/// as well.
pub struct MutationObserver {
    stream: MutationStream,
    disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl MutationObserver {
    /// Wrap a stream and the hook that tears the subscription down
    pub fn new(stream: MutationStream, disconnect: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stream,
            disconnect: Some(Box::new(disconnect)),
        }
    }

    /// Wait for the next mutation; `None` once the host closed the stream
    pub async fn next_mutation(&mut self) -> Option<()> {
        self.stream.next().await
    }

    /// Stop observing
    pub fn disconnect(mut self) {
        if let Some(hook) = self.disconnect.take() {
            hook();
        }
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        if let Some(hook) = self.disconnect.take() {
            hook();
        }
    }
}

impl fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationObserver")
            .field("connected", &self.disconnect.is_some())
            .finish_non_exhaustive()
    }
}

/// The host page as seen by the engine
pub trait PageDocument: Send + Sync {
    /// Stable identifier of this document
    fn document_id(&self) -> String;

    /// Atomically claim the document for one engine instance
    ///
    /// Returns `false` when another instance already owns it.
    fn try_claim_engine(&self) -> bool;

    /// Element with the given `id`
    fn element_by_id(&self, id: &str) -> Option<ElementSnapshot>;

    /// Snapshot of every element, in document order
    fn elements(&self) -> Vec<ElementSnapshot>;

    /// Descendants of `root`, in document order
    fn descendants(&self, root: ElementHandle) -> Vec<ElementSnapshot>;

    /// Show or hide an element
    fn set_visible(&self, element: ElementHandle, visible: bool) -> Result<()>;

    /// Call `handler` whenever `element` is activated
    fn add_activation_listener(&self, element: ElementHandle, handler: ActivationHandler)
    -> Result<()>;

    /// Subscribe to DOM mutations
    fn observe_mutations(&self) -> MutationObserver;

    /// Create a minimal accept/reject banner
    fn synthesize_banner(&self, spec: &FallbackBannerSpec) -> Result<FallbackBanner>;

    /// Whether a frame with this name exists in the document
    fn has_frame(&self, name: &str) -> bool;

    /// Attach a hidden, named frame
    ///
    /// Fails with [`crate::Error::NotFound`] when `parent` is not parsed yet.
    fn attach_frame(&self, parent: FrameParent, name: &str) -> Result<()>;

    /// Browser user agent
    fn user_agent(&self) -> String;

    /// Browser language
    fn language(&self) -> String;
}
