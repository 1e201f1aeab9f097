//! Persistence service
//!
//! Builds the Rocket instance and launches it on the configured address.

use std::sync::Arc;
use std::time::Instant;

use cmp_application::ports::ConsentLogServiceInterface;
use cmp_domain::error::{Error, Result};
use cmp_infrastructure::config::ServerConfig;
use rocket::{Build, Rocket, routes};
use tracing::info;

use crate::catchers::json_catchers;
use crate::fairings::{Cors, RequestLogger};
use crate::handlers::{get_consent, health, post_consent, preflight_consent};

/// Shared state of the handlers
pub struct ServerState {
    /// Consent logging
    pub service: Arc<dyn ConsentLogServiceInterface>,
    /// Start time, for the health endpoint
    pub started_at: Instant,
}

/// Build the Rocket application
pub fn consent_rocket(
    service: Arc<dyn ConsentLogServiceInterface>,
    cors_allowed_origin: &str,
) -> Rocket<Build> {
    rocket::build()
        .manage(ServerState {
            service,
            started_at: Instant::now(),
        })
        .mount(
            "/",
            routes![get_consent, post_consent, preflight_consent, health],
        )
        .register("/", json_catchers())
        .attach(Cors::new(cors_allowed_origin))
        .attach(RequestLogger)
}

/// The persistence service bound to its configuration
pub struct ConsentServer {
    config: ServerConfig,
    service: Arc<dyn ConsentLogServiceInterface>,
}

impl ConsentServer {
    /// Create the server
    pub fn new(config: ServerConfig, service: Arc<dyn ConsentLogServiceInterface>) -> Self {
        Self { config, service }
    }

    /// Rocket instance without network configuration
    pub fn rocket(&self) -> Rocket<Build> {
        consent_rocket(Arc::clone(&self.service), &self.config.cors_allowed_origin)
    }

    /// Listen until shutdown
    ///
    /// Rocket's own logger is disabled; requests are logged through
    /// `tracing` by the request logger fairing.
    pub async fn start(self) -> Result<()> {
        info!(
            host = %self.config.host,
            port = self.config.port,
            "Persistence service listening"
        );
        let figment = rocket::Config::figment()
            .merge(("address", self.config.host.clone()))
            .merge(("port", self.config.port))
            .merge(("log_level", "off"));

        self.rocket()
            .configure(figment)
            .launch()
            .await
            .map_err(|e| Error::infrastructure(format!("Persistence service failed: {e}")))?;
        Ok(())
    }
}
