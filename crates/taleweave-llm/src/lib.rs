//! Taleweave: HTTP client for OpenAI-compatible chat and embedding APIs.
//!
//! [`LlmClient`] implements the core [`TextGenerator`] and [`Embedder`]
//! ports. Any provider exposing `/chat/completions` and `/embeddings` in the
//! OpenAI shape works; the base URL, key and model names are configuration.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use taleweave_core::error::DomainError;
use taleweave_core::generation::{CompletionRequest, Embedder, TextGenerator};
use thiserror::Error;
use tracing::{debug, warn};

use crate::wire::{
    ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, ErrorEnvelope,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the provider client.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was configured.
    #[error("API key not configured")]
    NoApiKey,

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Provider's error message, or the raw body.
        message: String,
    },

    /// The response body was not what we expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The client could not be built from its settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<Error> for DomainError {
    fn from(e: Error) -> Self {
        match e {
            Error::NoApiKey | Error::Config(_) => Self::Infrastructure(e.to_string()),
            Error::Network(_) | Error::Api { .. } | Error::Parse(_) => Self::Upstream(e.to_string()),
        }
    }
}

/// Connection settings for the provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model used for chat completions.
    pub chat_model: String,
    /// Model used for embeddings.
    pub embedding_model: String,
}

impl LlmSettings {
    /// Settings with the default URL and models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            chat_model: DEFAULT_CHAT_MODEL.to_owned(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_owned(),
        }
    }
}

/// Client for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    settings: LlmSettings,
}

impl LlmClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoApiKey` for a blank key and `Error::Config` if the
    /// key is not a valid header value or the HTTP client cannot be built.
    pub fn new(mut settings: LlmSettings) -> Result<Self, Error> {
        if settings.api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key.trim()))
            .map_err(|e| Error::Config(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        settings.base_url = settings.base_url.trim_end_matches('/').to_owned();
        Ok(Self { client, settings })
    }

    /// The active settings.
    #[must_use]
    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{path}", self.settings.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %path, "provider request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    /// Runs a chat completion and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network`, `Error::Api` or `Error::Parse`; a response
    /// without any reply text is a parse error.
    pub async fn chat(&self, request: &CompletionRequest) -> Result<String, Error> {
        let body = ChatRequest::from_completion(&self.settings.chat_model, request);
        let response: ChatResponse = self.post("chat/completions", &body).await?;
        debug!(model = %self.settings.chat_model, "chat completion received");
        first_reply(response)
    }

    /// Embeds one text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network`, `Error::Api` or `Error::Parse`; a response
    /// without a vector is a parse error.
    pub async fn embedding(&self, text: &str) -> Result<Vec<f32>, Error> {
        let body = EmbeddingRequest {
            model: &self.settings.embedding_model,
            input: text,
        };
        let response: EmbeddingResponse = self.post("embeddings", &body).await?;
        first_embedding(response)
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_owned())
}

fn first_reply(response: ChatResponse) -> Result<String, Error> {
    response
        .choices
        .into_iter()
        .find_map(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::Parse("response contained no reply text".into()))
}

fn first_embedding(response: EmbeddingResponse) -> Result<Vec<f32>, Error> {
    response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::Parse("response contained no embedding".into()))
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        Ok(self.chat(request).await?)
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embedding(text).await?)
    }
}
