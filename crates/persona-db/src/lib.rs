//! Persona persistence
//!
//! Character records live in PostgreSQL when `DATABASE_URL` is set. Without it the
//! server runs on the in-memory repository.

pub mod character;
pub mod memory;

pub use character::{CharacterRepository, PgCharacterRepository};
pub use memory::InMemoryCharacterRepository;

use sqlx::PgPool;

/// Apply the workspace migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
