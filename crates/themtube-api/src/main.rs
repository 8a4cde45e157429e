use anyhow::Context;
use std::path::PathBuf;
use themtube_core::Config;
use themtube_infra::{init_telemetry, LogFormat};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse::<LogFormat>().ok())
        .unwrap_or_default();
    let log_directory = std::env::var("LOG_DIRECTORY")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from);

    // Held until exit so buffered file logs are flushed.
    let _telemetry = init_telemetry(
        log_format,
        log_directory.as_deref(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize the application (database, services, routes)
    let (_state, router) = themtube_api::setup::initialize_app(config.clone()).await?;

    themtube_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
