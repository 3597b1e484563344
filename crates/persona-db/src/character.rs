use chrono::Utc;
use persona_core::{AppError, Character, CharacterChanges, CharacterStats, NewCharacter};
use sqlx::{PgPool, Postgres};

const CHARACTER_COLUMNS: &str = "id, name, description, personality, image_url, \
     background_image_url, accent_color, text_color, traits, interests, is_active, \
     created_at, updated_at";

/// Trait for character persistence
/// This abstracts the database implementation (PostgreSQL or in-memory)
#[async_trait::async_trait]
pub trait CharacterRepository: Send + Sync {
    async fn insert(&self, character: NewCharacter) -> Result<Character, AppError>;

    async fn exists(&self, id: &str) -> Result<bool, AppError>;

    /// Fetch by id regardless of the active flag
    async fn get(&self, id: &str) -> Result<Option<Character>, AppError>;

    /// Newest first
    async fn list(&self, include_inactive: bool) -> Result<Vec<Character>, AppError>;

    /// Apply a partial update; `None` when the id is unknown
    async fn update(
        &self,
        id: &str,
        changes: CharacterChanges,
    ) -> Result<Option<Character>, AppError>;

    /// Permanently remove a record; `false` when the id is unknown
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    async fn stats(&self) -> Result<CharacterStats, AppError>;
}

#[derive(Clone)]
pub struct PgCharacterRepository {
    pool: PgPool,
}

impl PgCharacterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CharacterRepository for PgCharacterRepository {
    #[tracing::instrument(skip(self, character), fields(db.table = "characters", db.operation = "insert", db.record_id = %character.id))]
    async fn insert(&self, character: NewCharacter) -> Result<Character, AppError> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO characters (
                id, name, description, personality, image_url, background_image_url,
                accent_color, text_color, traits, interests, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $11)
            RETURNING {}
            "#,
            CHARACTER_COLUMNS
        );

        let created = sqlx::query_as::<Postgres, Character>(&query)
            .bind(&character.id)
            .bind(&character.name)
            .bind(&character.description)
            .bind(&character.personality)
            .bind(&character.image_url)
            .bind(&character.background_image_url)
            .bind(&character.accent_color)
            .bind(&character.text_color)
            .bind(&character.traits)
            .bind(&character.interests)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, id = %character.id, "Failed to insert character");
                e
            })?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "characters", db.operation = "select", db.record_id = %id))]
    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM characters WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "characters", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: &str) -> Result<Option<Character>, AppError> {
        let query = format!("SELECT {} FROM characters WHERE id = $1", CHARACTER_COLUMNS);
        let character = sqlx::query_as::<Postgres, Character>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(character)
    }

    #[tracing::instrument(skip(self), fields(db.table = "characters", db.operation = "select"))]
    async fn list(&self, include_inactive: bool) -> Result<Vec<Character>, AppError> {
        let query = format!(
            "SELECT {} FROM characters WHERE ($1 OR is_active) ORDER BY created_at DESC, id ASC",
            CHARACTER_COLUMNS
        );
        let characters = sqlx::query_as::<Postgres, Character>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        Ok(characters)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "characters", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: &str,
        changes: CharacterChanges,
    ) -> Result<Option<Character>, AppError> {
        let query = format!(
            r#"
            UPDATE characters SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                personality = COALESCE($4, personality),
                image_url = COALESCE($5, image_url),
                background_image_url = COALESCE($6, background_image_url),
                accent_color = COALESCE($7, accent_color),
                text_color = COALESCE($8, text_color),
                traits = COALESCE($9, traits),
                interests = COALESCE($10, interests),
                is_active = COALESCE($11, is_active),
                updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            CHARACTER_COLUMNS
        );

        let updated = sqlx::query_as::<Postgres, Character>(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.personality)
            .bind(changes.image_url)
            .bind(changes.background_image_url)
            .bind(changes.accent_color)
            .bind(changes.text_color)
            .bind(changes.traits)
            .bind(changes.interests)
            .bind(changes.is_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(db.table = "characters", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "characters", db.operation = "select"))]
    async fn stats(&self) -> Result<CharacterStats, AppError> {
        let (total, active) = sqlx::query_as::<Postgres, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM characters",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CharacterStats {
            total,
            active,
            inactive: total - active,
        })
    }
}
