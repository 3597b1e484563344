use crate::error::HttpAppError;
use crate::services::CharacterForm;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub async fn list_characters(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let characters = state.characters.list_active().await?;
    Ok(Json(characters))
}

pub async fn get_character(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let character = state.characters.get_active(&id).await?;
    Ok(Json(character))
}

#[tracing::instrument(skip(state, multipart), fields(operation = "create_character"))]
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = CharacterForm::from_multipart(multipart?, state.characters.max_upload_bytes()).await?;
    let character = state.characters.create(form).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

#[tracing::instrument(skip(state, multipart), fields(operation = "update_character"))]
pub async fn update_character(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = CharacterForm::from_multipart(multipart?, state.characters.max_upload_bytes()).await?;
    let character = state.characters.update(&id, form).await?;
    Ok(Json(character))
}

pub async fn delete_character(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.characters.soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
