//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use themtube_core::Config;

/// Connect every backend and build the router.
///
/// Telemetry must already be initialized so startup failures are logged.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.server.environment,
        version = %config.server.version,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, pool, storage)?;
    state
        .jobs
        .resume_unfinished(state.videos.as_ref())
        .await
        .context("Failed to resume unfinished transcodes")?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
