//! Ports for text generation and embeddings.
//!
//! Domain crates build [`CompletionRequest`]s and hand them to a
//! [`TextGenerator`]; the HTTP implementation lives in `taleweave-llm`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human player.
    User,
    /// The AI character.
    Assistant,
}

/// A single turn of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the turn.
    pub role: ChatRole,
    /// Text of the turn.
    pub content: String,
}

impl ChatMessage {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A provider-neutral completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// System prompt.
    pub system: String,
    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Produces text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError>;
}

/// Produces vector embeddings for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the embedding vector for `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
}
