//! Virtual Page Document
//!
//! An in-memory element tree implementing the `PageDocument` port. Used to
//! drive the engine outside a browser: the `simulate` command and the test
//! suites build pages with it, click controls and append late banners.

use crate::constants::{VIRTUAL_LANGUAGE, VIRTUAL_USER_AGENT};
use cmp_domain::constants::ACTION_MARKER_ATTRIBUTE;
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::{
    ActivationHandler, ElementHandle, ElementSnapshot, FallbackBanner, FallbackBannerSpec,
    FrameParent, MutationObserver, PageDocument,
};
use futures::channel::mpsc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Description of an element to append
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: String,
    attributes: BTreeMap<String, String>,
    hidden: bool,
    checked: Option<bool>,
}

impl ElementSpec {
    /// Element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// A `<button>` with a label
    pub fn button(label: impl Into<String>) -> Self {
        Self::new("button").text(label)
    }

    /// A checkbox `<input>`
    pub fn checkbox(checked: bool) -> Self {
        Self::new("input").attr("type", "checkbox").checked(checked)
    }

    /// Set the `id`
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the element's own text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `data-cmp-action` marker
    pub fn action(self, action: impl Into<String>) -> Self {
        self.attr(ACTION_MARKER_ATTRIBUTE, action)
    }

    /// Start hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the checkbox state
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    spec: ElementSpec,
    visible: bool,
    parent: Option<ElementHandle>,
    children: Vec<ElementHandle>,
}

#[derive(Default)]
struct Tree {
    nodes: HashMap<ElementHandle, Node>,
    root: Option<ElementHandle>,
    head: Option<ElementHandle>,
    body: Option<ElementHandle>,
    next_handle: u64,
    listeners: HashMap<ElementHandle, Vec<ActivationHandler>>,
}

impl Tree {
    fn insert(&mut self, parent: Option<ElementHandle>, spec: ElementSpec) -> ElementHandle {
        self.next_handle += 1;
        let handle = ElementHandle(self.next_handle);
        let visible = !spec.hidden;
        self.nodes.insert(
            handle,
            Node {
                spec,
                visible,
                parent,
                children: Vec::new(),
            },
        );
        if let Some(node) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            node.children.push(handle);
        }
        handle
    }

    /// Handles below `root` in document order, `root` excluded
    fn walk(&self, root: ElementHandle) -> Vec<ElementHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementHandle> = self
            .nodes
            .get(&root)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(node) = self.nodes.get(&handle) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn text_of(&self, handle: ElementHandle) -> String {
        let own = self.nodes.get(&handle).map(|node| node.spec.text.as_str());
        own.into_iter()
            .chain(
                self.walk(handle)
                    .into_iter()
                    .filter_map(|h| self.nodes.get(&h).map(|node| node.spec.text.as_str())),
            )
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn snapshot(&self, handle: ElementHandle) -> Option<ElementSnapshot> {
        let node = self.nodes.get(&handle)?;
        Some(ElementSnapshot {
            handle,
            tag: node.spec.tag.clone(),
            id: node.spec.id.clone(),
            classes: node.spec.classes.clone(),
            text: self.text_of(handle),
            attributes: node.spec.attributes.clone(),
            visible: node.visible,
            checked: node.spec.checked,
            parent: node.parent,
        })
    }
}

type ObserverMap = Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<()>>>>;

/// In-memory `PageDocument`
pub struct VirtualDocument {
    document_id: String,
    claimed: AtomicBool,
    tree: Mutex<Tree>,
    observers: ObserverMap,
    next_observer: AtomicU64,
    user_agent: String,
    language: String,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// A fully parsed, empty page (`html`, `head`, `body`)
    pub fn new() -> Self {
        let document = Self::bare();
        {
            let mut tree = document.lock();
            let root = tree.insert(None, ElementSpec::new("html"));
            tree.root = Some(root);
            tree.head = Some(tree.insert(Some(root), ElementSpec::new("head")));
            tree.body = Some(tree.insert(Some(root), ElementSpec::new("body")));
        }
        document
    }

    /// A page whose body has not been parsed yet
    pub fn without_body() -> Self {
        let document = Self::bare();
        {
            let mut tree = document.lock();
            let root = tree.insert(None, ElementSpec::new("html"));
            tree.root = Some(root);
            tree.head = Some(tree.insert(Some(root), ElementSpec::new("head")));
        }
        document
    }

    /// A page where neither head nor body exist yet
    pub fn unparsed() -> Self {
        let document = Self::bare();
        {
            let mut tree = document.lock();
            tree.root = Some(tree.insert(None, ElementSpec::new("html")));
        }
        document
    }

    fn bare() -> Self {
        Self {
            document_id: uuid::Uuid::new_v4().to_string(),
            claimed: AtomicBool::new(false),
            tree: Mutex::new(Tree::default()),
            observers: Arc::new(Mutex::new(HashMap::new())),
            next_observer: AtomicU64::new(0),
            user_agent: VIRTUAL_USER_AGENT.to_string(),
            language: VIRTUAL_LANGUAGE.to_string(),
        }
    }

    /// Override the reported user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the reported language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// The body element, once parsed
    pub fn body(&self) -> Option<ElementHandle> {
        self.lock().body
    }

    /// Finish parsing: create the head and body if missing
    pub fn finish_parsing(&self) -> ElementHandle {
        let body = {
            let mut tree = self.lock();
            let root = match tree.root {
                Some(root) => root,
                None => {
                    let root = tree.insert(None, ElementSpec::new("html"));
                    tree.root = Some(root);
                    root
                }
            };
            if tree.head.is_none() {
                tree.head = Some(tree.insert(Some(root), ElementSpec::new("head")));
            }
            match tree.body {
                Some(body) => body,
                None => {
                    let body = tree.insert(Some(root), ElementSpec::new("body"));
                    tree.body = Some(body);
                    body
                }
            }
        };
        self.notify_mutation();
        body
    }

    /// Append an element under `parent`
    pub fn append(&self, parent: ElementHandle, spec: ElementSpec) -> Result<ElementHandle> {
        let handle = {
            let mut tree = self.lock();
            if !tree.nodes.contains_key(&parent) {
                return Err(Error::not_found(format!("element {parent}")));
            }
            tree.insert(Some(parent), spec)
        };
        self.notify_mutation();
        Ok(handle)
    }

    /// Append an element to the body
    pub fn append_to_body(&self, spec: ElementSpec) -> Result<ElementHandle> {
        let body = self
            .body()
            .ok_or_else(|| Error::not_found("document body"))?;
        self.append(body, spec)
    }

    /// Simulate a visitor activating `element`
    ///
    /// Handlers run outside the document lock.
    pub fn click(&self, element: ElementHandle) -> usize {
        let handlers: Vec<ActivationHandler> = self
            .lock()
            .listeners
            .get(&element)
            .cloned()
            .unwrap_or_default();
        debug!(element = %element, handlers = handlers.len(), "Virtual click");
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Set a checkbox state
    pub fn set_checked(&self, element: ElementHandle, checked: bool) -> Result<()> {
        let mut tree = self.lock();
        let node = tree
            .nodes
            .get_mut(&element)
            .ok_or_else(|| Error::not_found(format!("element {element}")))?;
        node.spec.checked = Some(checked);
        Ok(())
    }

    /// Whether `element` is rendered
    pub fn is_visible(&self, element: ElementHandle) -> bool {
        self.lock()
            .nodes
            .get(&element)
            .is_some_and(|node| node.visible)
    }

    /// Snapshot of a single element
    pub fn snapshot(&self, element: ElementHandle) -> Option<ElementSnapshot> {
        self.lock().snapshot(element)
    }

    /// Number of activation listeners on `element`
    pub fn listener_count(&self, element: ElementHandle) -> usize {
        self.lock().listeners.get(&element).map_or(0, Vec::len)
    }

    /// Number of mutation observers still connected
    pub fn observer_count(&self) -> usize {
        lock_observers(&self.observers).len()
    }

    /// Whether another engine instance claimed this document
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    fn notify_mutation(&self) {
        let observers = lock_observers(&self.observers);
        for sender in observers.values() {
            // A closed receiver is removed by its disconnect hook
            let _ = sender.unbounded_send(());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_observers(
    observers: &Mutex<HashMap<u64, mpsc::UnboundedSender<()>>>,
) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<()>>> {
    observers.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PageDocument for VirtualDocument {
    fn document_id(&self) -> String {
        self.document_id.clone()
    }

    fn try_claim_engine(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementSnapshot> {
        let tree = self.lock();
        let root = tree.root?;
        std::iter::once(root)
            .chain(tree.walk(root))
            .find(|handle| {
                tree.nodes
                    .get(handle)
                    .is_some_and(|node| node.spec.id.as_deref() == Some(id))
            })
            .and_then(|handle| tree.snapshot(handle))
    }

    fn elements(&self) -> Vec<ElementSnapshot> {
        let tree = self.lock();
        let Some(root) = tree.root else {
            return Vec::new();
        };
        std::iter::once(root)
            .chain(tree.walk(root))
            .filter_map(|handle| tree.snapshot(handle))
            .collect()
    }

    fn descendants(&self, root: ElementHandle) -> Vec<ElementSnapshot> {
        let tree = self.lock();
        tree.walk(root)
            .into_iter()
            .filter_map(|handle| tree.snapshot(handle))
            .collect()
    }

    fn set_visible(&self, element: ElementHandle, visible: bool) -> Result<()> {
        let mut tree = self.lock();
        let node = tree
            .nodes
            .get_mut(&element)
            .ok_or_else(|| Error::not_found(format!("element {element}")))?;
        node.visible = visible;
        Ok(())
    }

    fn add_activation_listener(
        &self,
        element: ElementHandle,
        handler: ActivationHandler,
    ) -> Result<()> {
        let mut tree = self.lock();
        if !tree.nodes.contains_key(&element) {
            return Err(Error::not_found(format!("element {element}")));
        }
        tree.listeners.entry(element).or_default().push(handler);
        Ok(())
    }

    fn observe_mutations(&self) -> MutationObserver {
        let (tx, rx) = mpsc::unbounded();
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        lock_observers(&self.observers).insert(id, tx);

        let observers = Arc::downgrade(&self.observers);
        MutationObserver::new(Box::pin(rx), move || {
            if let Some(observers) = observers.upgrade() {
                lock_observers(&observers).remove(&id);
            }
        })
    }

    fn synthesize_banner(&self, spec: &FallbackBannerSpec) -> Result<FallbackBanner> {
        let parent = {
            let tree = self.lock();
            tree.body
                .or(tree.root)
                .ok_or_else(|| Error::not_found("document root"))?
        };
        let root = self.append(
            parent,
            ElementSpec::new("div")
                .id(spec.element_id.clone())
                .class("cmp-fallback-banner")
                .attr("role", "dialog")
                .hidden(),
        )?;
        self.append(root, ElementSpec::new("p").text(spec.message.clone()))?;
        let accept = self.append(
            root,
            ElementSpec::button(spec.accept_label.clone()).action("accept_all"),
        )?;
        let reject = self.append(
            root,
            ElementSpec::button(spec.reject_label.clone()).action("reject_all"),
        )?;
        Ok(FallbackBanner {
            root,
            accept,
            reject,
        })
    }

    fn has_frame(&self, name: &str) -> bool {
        let tree = self.lock();
        tree.nodes.values().any(|node| {
            node.spec.tag == "iframe"
                && node.spec.attributes.get("name").map(String::as_str) == Some(name)
        })
    }

    fn attach_frame(&self, parent: FrameParent, name: &str) -> Result<()> {
        let target = {
            let tree = self.lock();
            match parent {
                FrameParent::Body => tree.body,
                FrameParent::Head => tree.head,
            }
        };
        let target = target.ok_or_else(|| Error::not_found(format!("{parent:?} element")))?;
        self.append(
            target,
            ElementSpec::new("iframe")
                .attr("name", name)
                .attr("aria-hidden", "true")
                .hidden(),
        )?;
        Ok(())
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn language(&self) -> String {
        self.language.clone()
    }
}
