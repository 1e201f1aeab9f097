//! Configuration Loader Tests

use cmp_domain::Error;
use cmp_infrastructure::config::loader::validate_app_config;
use cmp_infrastructure::config::{AppConfig, ConfigLoader};
use cmp_infrastructure::constants::{DEFAULT_LOG_LEVEL, DEFAULT_SERVER_PORT};
use figment::Jail;
use tempfile::TempDir;

#[test]
fn test_defaults_are_valid() {
    let config = AppConfig::default();
    assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    assert_eq!(config.engine.discovery_window_ms, 3000);
    assert_eq!(config.storage.durable.as_deref(), Some("file"));
    assert!(validate_app_config(&config).is_ok());
}

#[test]
fn test_file_then_environment() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "cmp.toml",
            r#"
                [server]
                port = 9000

                [engine]
                site_id = "from-file"
                cmp_id = 42
            "#,
        )?;
        jail.set_env("CMP_ENGINE__SITE_ID", "from-env");
        jail.set_env("CMP_LOGGING__JSON_FORMAT", "true");

        let config = ConfigLoader::new()
            .with_config_path("cmp.toml")
            .load()
            .map_err(|e| e.to_string())?;

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.engine.site_id, "from-env");
        assert_eq!(config.engine.cmp_id, 42);
        assert!(config.logging.json_format);
        assert_eq!(config.engine.debounce_ms, 1000);
        Ok(())
    });
}

#[test]
fn test_default_file_in_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_file("cmp.toml", "[client]\ntimeout_ms = 250\n")?;
        let config = ConfigLoader::new().load().map_err(|e| e.to_string())?;
        assert_eq!(config.client.timeout_ms, 250);
        Ok(())
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let result = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .load();
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_save_then_load() {
    // Inside a jail so environment set by other tests cannot leak in
    Jail::expect_with(|jail| {
        let path = jail.directory().join("saved.toml");

        let mut config = AppConfig::default();
        config.server.port = 9999;
        config.engine.site_id = "saved-site".to_string();

        let loader = ConfigLoader::new();
        loader.save_to_file(&config, &path).map_err(|e| e.to_string())?;
        let loaded = ConfigLoader::new()
            .with_config_path(&path)
            .load()
            .map_err(|e| e.to_string())?;

        assert_eq!(loaded.server.port, 9999);
        assert_eq!(loaded.engine.site_id, "saved-site");
        Ok(())
    });
}

#[test]
fn test_validation_rules() {
    let invalid = [
        {
            let mut c = AppConfig::default();
            c.server.port = 0;
            c
        },
        {
            let mut c = AppConfig::default();
            c.engine.site_id = "  ".to_string();
            c
        },
        {
            let mut c = AppConfig::default();
            c.engine.discovery_window_ms = 0;
            c
        },
        {
            let mut c = AppConfig::default();
            c.engine.debounce_ms = 0;
            c
        },
        {
            let mut c = AppConfig::default();
            c.engine.discovery_max_attempts = 20;
            c.engine.discovery_retry_delay_ms = 500;
            c
        },
        {
            let mut c = AppConfig::default();
            c.client.base_url = "not a url".to_string();
            c
        },
        {
            let mut c = AppConfig::default();
            c.logging.level = "loud".to_string();
            c
        },
    ];

    for config in &invalid {
        assert!(
            matches!(validate_app_config(config), Err(Error::Configuration { .. })),
            "expected rejection of {config:?}"
        );
    }
}
