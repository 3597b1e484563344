//! Gallery listings served straight from the storage backend.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub items: Vec<String>,
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GalleryResponse>, HttpAppError> {
    let items = state.listing.videos().await?;
    Ok(Json(GalleryResponse { items }))
}

pub async fn list_carousel(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GalleryResponse>, HttpAppError> {
    let items = state.listing.carousel().await?;
    Ok(Json(GalleryResponse { items }))
}
