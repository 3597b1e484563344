//! Application state shared by every handler.

use crate::services::{CharacterService, ChatService, ListingService};
use persona_core::Config;
use persona_storage::StorageSet;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: StorageSet,
    pub characters: CharacterService,
    pub listing: ListingService,
    pub chat: ChatService,
    /// `None` when running on the in-memory repository
    pub db_pool: Option<PgPool>,
}
