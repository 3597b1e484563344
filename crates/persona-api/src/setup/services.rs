//! Service wiring: repositories, storage and clients into `AppState`.

use crate::services::{
    CharacterService, ChatCompletionClient, ChatService, ListingService, OpenAiChatClient,
    UploadOrchestrator,
};
use crate::state::AppState;
use anyhow::{Context, Result};
use persona_core::Config;
use persona_db::CharacterRepository;
use persona_storage::StorageSet;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(
    config: Arc<Config>,
    repository: Arc<dyn CharacterRepository>,
    db_pool: Option<PgPool>,
    storage: StorageSet,
) -> Result<Arc<AppState>> {
    let chat_client = OpenAiChatClient::from_config(&config.chat)
        .context("Failed to build chat client")?
        .map(|client| Arc::new(client) as Arc<dyn ChatCompletionClient>);

    match &chat_client {
        Some(_) => tracing::info!(model = %config.chat.model, "Chat provider configured"),
        None => tracing::warn!("CHAT_API_KEY not set, chat endpoint will return 503"),
    }

    Ok(build_state(config, repository, db_pool, storage, chat_client))
}

/// Assemble state from already-built parts.
pub fn build_state(
    config: Arc<Config>,
    repository: Arc<dyn CharacterRepository>,
    db_pool: Option<PgPool>,
    storage: StorageSet,
    chat_client: Option<Arc<dyn ChatCompletionClient>>,
) -> Arc<AppState> {
    let uploads = Arc::new(UploadOrchestrator::new(storage.clone(), config.images.clone()));
    let listing = ListingService::new(storage.primary().clone(), config.gallery.clone());

    Arc::new(AppState {
        characters: CharacterService::new(repository.clone(), uploads),
        chat: ChatService::new(repository, chat_client),
        listing,
        storage,
        db_pool,
        config,
    })
}
