//! Configuration loader
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `AppConfig::default()`
//! 2. a TOML file: the explicit path, else the first of `./cmp.toml`,
//!    `./cmp/cmp.toml` and `$XDG_CONFIG_HOME/cmp/cmp.toml` that exists
//! 3. `CMP_` environment variables, nested keys split on `__`
//!    (`CMP_SERVER__PORT=9000`, `CMP_ENGINE__SITE_ID=shop`)

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use cmp_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader with the default file search and `CMP_` prefix
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// The explicit configuration file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            // An explicit path that does not exist is an error, not a silent default
            if !config_path.exists() {
                log_config_loaded(config_path, false);
                return Err(Error::configuration(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            figment = figment.merge(Toml::file(config_path));
            log_config_loaded(config_path, true);
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;
        validate_app_config(&config)?;
        Ok(config)
    }

    /// Write a configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;
        Ok(())
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;
        let mut candidates = vec![
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
        }
        candidates.into_iter().find(|path| path.exists())
    }
}

/// Validate every configuration section
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_server_config(config)?;
    validate_client_config(config)?;
    validate_engine_config(config)?;
    parse_log_level(&config.logging.level)?;
    Ok(())
}

fn validate_server_config(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(Error::configuration("Server port cannot be 0"));
    }
    Ok(())
}

fn validate_client_config(config: &AppConfig) -> Result<()> {
    reqwest::Url::parse(&config.client.base_url)
        .config_context(format!("Invalid persistence URL '{}'", config.client.base_url))?;
    if config.client.timeout_ms == 0 {
        return Err(Error::configuration("Client timeout cannot be 0"));
    }
    Ok(())
}

fn validate_engine_config(config: &AppConfig) -> Result<()> {
    let engine = &config.engine;
    if engine.site_id.trim().is_empty() {
        return Err(Error::configuration("Engine site id cannot be empty"));
    }
    if engine.discovery_window_ms == 0 || engine.discovery_max_attempts == 0 {
        return Err(Error::configuration(
            "Discovery window and attempt count must be positive",
        ));
    }
    if engine.debounce_ms == 0 {
        return Err(Error::configuration("Debounce window must be positive"));
    }
    let retry_budget = engine
        .discovery_retry_delay_ms
        .saturating_mul(u64::from(engine.discovery_max_attempts));
    if retry_budget > engine.discovery_window_ms {
        return Err(Error::configuration(format!(
            "Discovery retries ({} x {}ms) exceed the {}ms discovery window",
            engine.discovery_max_attempts,
            engine.discovery_retry_delay_ms,
            engine.discovery_window_ms
        )));
    }
    Ok(())
}
