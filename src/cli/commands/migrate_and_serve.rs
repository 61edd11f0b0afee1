use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::{initdb::apply_migrations, serve::run_server};
use crate::config::AppConfig;
use crate::schemas::AppState;

pub async fn migrate_and_serve(config: &AppConfig) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", config.database_url);
    debug!("Bind address: {}", config.bind_address);

    let db = apply_migrations(&config.database_url).await?;
    let state = AppState::new(
        db,
        Duration::from_secs(config.term_cache_ttl_secs),
        Duration::from_secs(config.request_timeout_secs),
    );

    run_server(state, &config.bind_address).await
}
