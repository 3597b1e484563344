use async_trait::async_trait;
use persona_api::services::{ChatCompletionClient, ChatMessage};
use persona_core::AppError;
use std::sync::Mutex;

/// Answers with a fixed reply and records what it was sent.
pub struct ScriptedChat {
    pub reply: String,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatCompletionClient for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// Provider that always fails upstream.
pub struct BrokenChat;

#[async_trait]
impl ChatCompletionClient for BrokenChat {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AppError> {
        Err(AppError::Upstream("provider returned 500".to_string()))
    }
}
