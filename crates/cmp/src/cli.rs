//! Command line interface

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use cmp_domain::error::Result;
use cmp_domain::ports::ConsentPersistence;
use cmp_domain::value_objects::BannerAction;
use cmp_infrastructure::bootstrap::{ConsentServiceFactory, EngineFactory};
use cmp_infrastructure::config::loader::validate_app_config;
use cmp_infrastructure::config::{AppConfig, ConfigLoader};
use cmp_infrastructure::error_ext::ErrorContext;
use cmp_infrastructure::logging::init_logging;
use cmp_providers::persistence::LocalConsentPersistence;
use cmp_server::ConsentServer;

use crate::simulate::run_simulation;

/// Command line interface of the consent engine
#[derive(Parser, Debug)]
#[command(name = "cmp")]
#[command(about = "Consent management engine and persistence service")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the persistence service
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Drive one engine instance against a virtual page
    Simulate {
        /// Site to collect consent for
        #[arg(long)]
        site: String,

        /// Choice the simulated visitor makes
        #[arg(long, value_enum, default_value_t = Choice::Accept)]
        choice: Choice,

        /// Use an in-process consent service instead of the HTTP one
        #[arg(long)]
        offline: bool,
    },
}

/// Visitor choice of a simulation
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Accept all purposes and vendors
    Accept,
    /// Reject everything optional
    Reject,
}

impl From<Choice> for BannerAction {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Accept => BannerAction::AcceptAll,
            Choice::Reject => BannerAction::RejectAll,
        }
    }
}

/// Load configuration, install logging and run the command
pub async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load()?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Simulate {
            site,
            choice,
            offline,
        } => {
            config.engine.site_id = site;
            validate_app_config(&config)?;
            simulate(&config, choice, offline).await
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let service = ConsentServiceFactory::create(&config);
    ConsentServer::new(config.server, service).start().await
}

async fn simulate(config: &AppConfig, choice: Choice, offline: bool) -> Result<()> {
    let persistence: Arc<dyn ConsentPersistence> = if offline {
        let service = ConsentServiceFactory::create(config);
        Arc::new(LocalConsentPersistence::new(service))
    } else {
        EngineFactory::http_persistence(&config.client)?
    };
    let report = run_simulation(config, choice.into(), persistence).await?;
    let rendered =
        serde_json::to_string_pretty(&report).context("Failed to render simulation report")?;
    println!("{rendered}");
    Ok(())
}
