//! Dashboard endpoints. Mounted behind `admin_auth_middleware`.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.characters.stats().await?;
    Ok(Json(stats))
}

/// All characters, including soft-deleted ones
pub async fn list_all_characters(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let characters = state.characters.list_all().await?;
    Ok(Json(characters))
}

pub async fn restore_character(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let character = state.characters.restore(&id).await?;
    Ok(Json(character))
}

pub async fn hard_delete_character(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.characters.hard_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
