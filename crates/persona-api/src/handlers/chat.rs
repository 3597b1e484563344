use crate::error::{HttpAppError, ValidatedJson};
use crate::services::ChatMessage;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub character_id: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[tracing::instrument(skip_all, fields(character_id = %request.character_id))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, HttpAppError> {
    let reply = state
        .chat
        .reply(&request.character_id, &request.messages, &request.message)
        .await?;
    Ok(Json(ChatResponse { reply }))
}
