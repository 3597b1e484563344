//! Database setup and initialization

use anyhow::{Context, Result};
use persona_core::Config;
use persona_db::{
    run_migrations, CharacterRepository, InMemoryCharacterRepository, PgCharacterRepository,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Connect and migrate when `DATABASE_URL` is set; otherwise fall back to the
/// in-memory repository.
pub async fn setup_database(
    config: &Config,
) -> Result<(Arc<dyn CharacterRepository>, Option<PgPool>)> {
    let Some(database_url) = config.base.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, characters are kept in memory and lost on restart"
        );
        return Ok((Arc::new(InMemoryCharacterRepository::new()), None));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected successfully"
    );

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok((Arc::new(PgCharacterRepository::new(pool.clone())), Some(pool)))
}
