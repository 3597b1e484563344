//! Character chat: builds the persona prompt and forwards it to a hosted
//! chat-completion provider (OpenAI-compatible API).

use async_trait::async_trait;
use persona_core::{AppError, ChatConfig, Character};
use persona_db::CharacterRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A provider that turns a message list into one assistant reply.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError>;
}

// Chat Completions API request/response
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiChatClient {
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    /// `None` when no API key is configured.
    pub fn from_config(config: &ChatConfig) -> Result<Option<Self>, anyhow::Error> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Some(Self {
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        }))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %text, "Chat provider returned an error");
            return Err(AppError::Upstream(format!(
                "Chat provider returned {}: {}",
                status, text
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid chat response: {}", e)))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Upstream("Chat provider returned no content".to_string()))?;

        tracing::info!(
            model = %self.model,
            messages = messages.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Chat completion received"
        );

        Ok(reply)
    }
}

/// Upper bound on client-supplied history forwarded to the provider.
const MAX_HISTORY_MESSAGES: usize = 20;

#[derive(Clone)]
pub struct ChatService {
    repository: Arc<dyn CharacterRepository>,
    client: Option<Arc<dyn ChatCompletionClient>>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn CharacterRepository>,
        client: Option<Arc<dyn ChatCompletionClient>>,
    ) -> Self {
        Self { repository, client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Reply in character to `message`, given the prior `history`.
    #[tracing::instrument(skip(self, history, message), fields(history_len = history.len()))]
    pub async fn reply(
        &self,
        character_id: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput("message must not be empty".to_string()));
        }

        let character = self
            .repository
            .get(character_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", character_id)))?;

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::Unavailable("Chat provider is not configured".to_string()))?;

        let messages = build_messages(&character, history, message);
        client.complete(&messages).await
    }
}

/// `[system persona, ...recent history, user message]`. Client-supplied system
/// messages are dropped.
pub fn build_messages(
    character: &Character,
    history: &[ChatMessage],
    message: &str,
) -> Vec<ChatMessage> {
    let recent: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.role != ChatRole::System && !m.content.trim().is_empty())
        .collect();
    let skip = recent.len().saturating_sub(MAX_HISTORY_MESSAGES);

    let mut messages = Vec::with_capacity(recent.len() - skip + 2);
    messages.push(ChatMessage::new(ChatRole::System, system_prompt(character)));
    messages.extend(recent.into_iter().skip(skip).cloned());
    messages.push(ChatMessage::new(ChatRole::User, message));
    messages
}

fn system_prompt(character: &Character) -> String {
    let mut prompt = format!(
        "You are {}. {}\n\nPersonality: {}",
        character.name, character.description, character.personality
    );
    if !character.traits.is_empty() {
        prompt.push_str(&format!("\nTraits: {}", character.traits.join(", ")));
    }
    if !character.interests.is_empty() {
        prompt.push_str(&format!("\nInterests: {}", character.interests.join(", ")));
    }
    prompt.push_str("\n\nStay in character and keep replies conversational.");
    prompt
}
