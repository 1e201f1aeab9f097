//! Dependency wiring
//!
//! Turns an [`AppConfig`] into the collaborators of an engine instance or
//! of the persistence service. Storage tiers are resolved by name through
//! the key-value store registry; a tier that cannot be created is left out
//! and the identity store degrades past it.

use std::sync::Arc;

use cmp_application::engine::EngineDependencies;
use cmp_application::ports::ConsentLogServiceInterface;
use cmp_application::registry::{StorageProviderConfig, resolve_storage_provider};
use cmp_application::use_cases::ConsentLogService;
use cmp_domain::error::Result;
use cmp_domain::ports::{
    ConsentPersistence, ConsentRepository, FrameMessenger, KeyValueStore, PageDocument,
    VendorListSource,
};
use cmp_providers::persistence::{HttpConsentPersistence, InMemoryConsentRepository};
use cmp_providers::token::CompactTokenEncoder;
use cmp_providers::vendor_list::StaticVendorList;
use tracing::{info, warn};

use crate::config::{AppConfig, ClientConfig, StorageConfig};
use crate::http::create_http_client;

/// Builds the dependencies of an embedded engine
pub struct EngineFactory;

impl EngineFactory {
    /// Durable and legacy tiers, in that order
    pub fn identity_stores(
        config: &StorageConfig,
    ) -> (Option<Arc<dyn KeyValueStore>>, Option<Arc<dyn KeyValueStore>>) {
        let durable = config.durable.as_deref().and_then(|name| {
            let mut provider = StorageProviderConfig::new(name);
            if let Some(path) = &config.durable_path {
                provider = provider.with_path(path);
            }
            Self::resolve_tier("durable", &provider)
        });
        let legacy = config.legacy.as_deref().and_then(|name| {
            let mut provider = StorageProviderConfig::new(name);
            if let Some(initial) = &config.legacy_initial {
                provider = provider.with_initial(initial);
            }
            Self::resolve_tier("legacy", &provider)
        });
        (durable, legacy)
    }

    fn resolve_tier(
        tier: &str,
        provider: &StorageProviderConfig,
    ) -> Option<Arc<dyn KeyValueStore>> {
        match resolve_storage_provider(provider) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(
                    tier,
                    provider = %provider.provider,
                    error = %e,
                    "Storage tier unavailable"
                );
                None
            }
        }
    }

    /// Vendor list from the configured file, or the standard purposes
    pub fn vendor_list(config: &AppConfig) -> Result<Arc<dyn VendorListSource>> {
        let source = match &config.client.vendor_list_path {
            Some(path) => StaticVendorList::from_file(path)?,
            None => StaticVendorList::standard(config.engine.gvl_version),
        };
        Ok(Arc::new(source))
    }

    /// HTTP client of the persistence service
    pub fn http_persistence(config: &ClientConfig) -> Result<Arc<dyn ConsentPersistence>> {
        let client = create_http_client(config)?;
        let persistence = HttpConsentPersistence::new(&config.base_url, config.timeout(), client)?;
        Ok(Arc::new(persistence))
    }

    /// Every dependency, talking to the persistence service over HTTP
    pub fn dependencies(
        config: &AppConfig,
        document: Arc<dyn PageDocument>,
        messenger: Arc<dyn FrameMessenger>,
    ) -> Result<EngineDependencies> {
        let persistence = Self::http_persistence(&config.client)?;
        Self::dependencies_with(config, document, messenger, persistence)
    }

    /// Every dependency, with a caller-supplied persistence client
    pub fn dependencies_with(
        config: &AppConfig,
        document: Arc<dyn PageDocument>,
        messenger: Arc<dyn FrameMessenger>,
        persistence: Arc<dyn ConsentPersistence>,
    ) -> Result<EngineDependencies> {
        let (durable_store, legacy_store) = Self::identity_stores(&config.storage);
        Ok(EngineDependencies {
            settings: config.engine.clone(),
            document,
            messenger,
            durable_store,
            legacy_store,
            persistence,
            encoder: Arc::new(CompactTokenEncoder::new()),
            vendor_list: Self::vendor_list(config)?,
        })
    }
}

/// Builds the server-side consent log service
pub struct ConsentServiceFactory;

impl ConsentServiceFactory {
    /// Consent log service over a fresh in-memory repository
    pub fn create(config: &AppConfig) -> Arc<dyn ConsentLogServiceInterface> {
        Self::with_repository(config, Arc::new(InMemoryConsentRepository::new()))
    }

    /// Consent log service over the given repository
    pub fn with_repository(
        config: &AppConfig,
        repository: Arc<dyn ConsentRepository>,
    ) -> Arc<dyn ConsentLogServiceInterface> {
        info!(
            gvl_version = config.engine.gvl_version,
            "Consent log service created"
        );
        Arc::new(ConsentLogService::new(
            repository,
            Arc::new(CompactTokenEncoder::new()),
            config.engine.gvl_version,
        ))
    }
}
