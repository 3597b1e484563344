//! Storage setup and initialization

use anyhow::{Context, Result};
use persona_core::Config;
use persona_storage::{create_storage, StorageSet};

pub async fn setup_storage(config: &Config) -> Result<StorageSet> {
    tracing::info!("Initializing storage backends...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(
        primary = %storage.primary().backend_type(),
        fallback_enabled = storage.has_remote(),
        "Storage initialized"
    );
    Ok(storage)
}
