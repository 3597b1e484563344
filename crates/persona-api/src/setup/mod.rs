//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a serving router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use persona_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        port = config.server_port(),
        "Configuration loaded and validated successfully"
    );

    let (repository, pool) = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let config = Arc::new(config);
    let state = services::initialize_services(config.clone(), repository, pool, storage)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
