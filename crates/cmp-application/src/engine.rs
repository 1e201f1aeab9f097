//! Consent Engine
//!
//! The one explicit context object of an embedded engine instance. It is
//! created once per document, wires the components in start-up order
//! (identity, command stub, bridge, controller) and is passed by reference
//! to whoever needs it.
//!
//! A second instance for the same document is refused through the
//! document's re-entry guard.

use crate::banner::{BannerLifecycleController, ControllerDeps};
use crate::tcf::{CommandStub, CrossFrameBridge, LocatorInstall, StubIdentity, TcfCallback};
use crate::use_cases::{IdentityStore, SubmissionClient};
use cmp_domain::error::{Error, Result};
use cmp_domain::ports::{
    ConsentPersistence, ConsentTokenEncoder, FrameMessenger, FrameRef, KeyValueStore,
    PageDocument, VendorListSource,
};
use cmp_domain::value_objects::{BannerState, EngineSettings, ListenerId, VisitorId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the engine needs from its host and backend
pub struct EngineDependencies {
    /// Engine settings
    pub settings: EngineSettings,
    /// Host page
    pub document: Arc<dyn PageDocument>,
    /// Messaging channel towards other frames
    pub messenger: Arc<dyn FrameMessenger>,
    /// Durable key-value tier
    pub durable_store: Option<Arc<dyn KeyValueStore>>,
    /// Legacy cookie-style tier
    pub legacy_store: Option<Arc<dyn KeyValueStore>>,
    /// Persistence service client
    pub persistence: Arc<dyn ConsentPersistence>,
    /// TC string encoder
    pub encoder: Arc<dyn ConsentTokenEncoder>,
    /// Vendor list
    pub vendor_list: Arc<dyn VendorListSource>,
}

/// A running engine instance
pub struct ConsentEngine {
    settings: EngineSettings,
    identity: IdentityStore,
    visitor_id: VisitorId,
    stub: Arc<CommandStub>,
    bridge: Arc<CrossFrameBridge>,
    locator: LocatorInstall,
    controller: BannerLifecycleController,
}

impl ConsentEngine {
    /// Claim the document and initialize every component
    ///
    /// Fails with [`Error::AlreadyRunning`] when another instance already
    /// owns the document. Nothing else fails: degraded storage and a
    /// missing frame parent are logged and handled in place.
    pub fn initialize(deps: EngineDependencies) -> Result<Self> {
        if !deps.document.try_claim_engine() {
            return Err(Error::AlreadyRunning {
                document: deps.document.document_id(),
            });
        }

        let settings = deps.settings;
        let identity = IdentityStore::new(
            settings.visitor_storage_key.clone(),
            deps.durable_store,
            deps.legacy_store,
        );
        let visitor_id = identity.get_or_create_visitor_id();

        let stub = Arc::new(CommandStub::new(StubIdentity::from(&settings)));

        let bridge = Arc::new(CrossFrameBridge::new(
            Arc::clone(&stub),
            Arc::clone(&deps.document),
            deps.messenger,
        ));
        let locator = bridge.install_locator();
        if locator == LocatorInstall::Deferred {
            Self::schedule_locator_retry(&bridge, &settings);
        }

        let submission = Arc::new(SubmissionClient::new(
            deps.persistence,
            deps.encoder,
            Arc::clone(&deps.document),
            settings.site(),
            visitor_id.clone(),
        ));
        let controller = BannerLifecycleController::new(ControllerDeps {
            settings: settings.clone(),
            document: deps.document,
            vendor_list: deps.vendor_list,
            stub: Arc::clone(&stub),
            submission,
            identity_degraded: identity.is_degraded(),
        });

        info!(
            site_id = %settings.site_id,
            visitor_id = %visitor_id,
            degraded = identity.is_degraded(),
            ?locator,
            "Consent engine initialized"
        );
        Ok(Self {
            settings,
            identity,
            visitor_id,
            stub,
            bridge,
            locator,
            controller,
        })
    }

    fn schedule_locator_retry(bridge: &Arc<CrossFrameBridge>, settings: &EngineSettings) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, locator frame not attached");
            return;
        };
        let bridge = Arc::clone(bridge);
        let attempts = settings.discovery_max_attempts;
        let delay = settings.discovery_retry_delay();
        runtime.spawn(async move {
            bridge.install_locator_with_retry(attempts, delay).await;
        });
    }

    /// Drive the banner lifecycle until suppressed or awaiting the visitor
    pub async fn run(&self) -> BannerState {
        self.controller.run().await
    }

    /// Dispatch a same-frame command
    pub fn call(
        &self,
        command: &str,
        version: Option<u32>,
        callback: TcfCallback,
        parameter: Option<&Value>,
    ) -> Option<ListenerId> {
        self.stub.call(command, version, callback, parameter)
    }

    /// Relay a message received from another frame
    pub fn handle_message(&self, source: &FrameRef, data: &Value) -> bool {
        self.bridge.handle_message(source, data)
    }

    /// Settings of this instance
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The visitor identifier
    pub fn visitor_id(&self) -> &VisitorId {
        &self.visitor_id
    }

    /// Whether the identifier only lives in memory
    pub fn identity_degraded(&self) -> bool {
        self.identity.is_degraded()
    }

    /// How the locator frame was installed at start-up
    pub fn locator_install(&self) -> LocatorInstall {
        self.locator
    }

    /// The command stub
    pub fn stub(&self) -> &Arc<CommandStub> {
        &self.stub
    }

    /// The lifecycle controller
    pub fn controller(&self) -> &BannerLifecycleController {
        &self.controller
    }
}
