pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::config::AppConfig;
use crate::core::Refresher;
use crate::core::country::CountryQuery;
use crate::providers::{OpenExchangeRatesProvider, RestCountriesProvider};
use crate::store::{CountryStore, FjallCountryStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Refresh,
    List(CountryQuery),
    Show(String),
    Delete(String),
    Status,
}

/// Long-lived handles shared by every command: the opened store and the
/// refresher wired to the configured feeds.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn CountryStore>,
    pub refresher: Arc<Refresher>,
}

impl AppContext {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let db_path = config.database_path()?;
        std::fs::create_dir_all(&db_path)
            .with_context(|| format!("Failed to create directory: {}", db_path.display()))?;
        let store = FjallCountryStore::open(&db_path)
            .with_context(|| format!("Failed to open country store at {}", db_path.display()))?;

        let timeout = config.sources.timeout();
        let catalog = RestCountriesProvider::new(&config.sources.countries.url, timeout);
        let rates = OpenExchangeRatesProvider::new(&config.sources.rates.url, timeout);
        let refresher = Refresher::new(Arc::new(catalog), Arc::new(rates), config.artifact_path()?);

        Ok(Self {
            config,
            store: Arc::new(store),
            refresher: Arc::new(refresher),
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ccx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ctx = AppContext::from_config(config)?;
    match command {
        AppCommand::Serve => cli::serve::run(&ctx).await,
        AppCommand::Refresh => cli::refresh::run(&ctx).await,
        AppCommand::List(query) => cli::countries::list(ctx.store.as_ref(), &query),
        AppCommand::Show(name) => cli::countries::show(ctx.store.as_ref(), &name),
        AppCommand::Delete(name) => cli::countries::delete(ctx.store.as_ref(), &name),
        AppCommand::Status => cli::countries::status(ctx.store.as_ref()),
    }
}
