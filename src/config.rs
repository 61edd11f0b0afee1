use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File};
use sea_orm::Database;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::schemas::AppState;

const CONFIG_FILE: &str = "config/feeledger";

/// Service configuration, read from `config/feeledger.toml` (optional)
/// and `FEELEDGER__*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_term_cache_ttl_secs")]
    pub term_cache_ttl_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://feeledger.db?mode=rwc".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_term_cache_ttl_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            bind_address: default_bind_address(),
            request_timeout_secs: default_request_timeout_secs(),
            term_cache_ttl_secs: default_term_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then the optional config file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix("FEELEDGER").separator("__")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }
}

/// Connects to the configured database and builds the shared state.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", config.database_url))?;

    if config.request_timeout_secs == 0 {
        warn!("request_timeout_secs is 0; every request will time out immediately");
    }

    Ok(AppState::new(
        db,
        Duration::from_secs(config.term_cache_ttl_secs),
        Duration::from_secs(config.request_timeout_secs),
    ))
}
