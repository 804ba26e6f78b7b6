//! Text-generation and embedding doubles.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use taleweave_core::generation::{CompletionRequest, Embedder, TextGenerator};

/// A generator that replies from a script, falling back to a fixed reply once
/// the script runs out. Every request is recorded.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<String>>,
    fallback: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    /// A generator that always answers `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::scripted(Vec::<String>::new(), reply)
    }

    /// A generator that answers each of `replies` in order, then `fallback`.
    pub fn scripted<I, S>(replies: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: fallback.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns every request received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// A generator whose provider is always down.
#[derive(Debug)]
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, DomainError> {
        Err(DomainError::Upstream("provider unavailable".into()))
    }
}

/// An embedder that maps text onto a tiny fixed-size vector of letter
/// frequencies, so similar strings land near each other.
#[derive(Debug, Default)]
pub struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    #[allow(clippy::cast_precision_loss)]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut vector = vec![0.0_f32; 26];
        for b in text.bytes().filter(u8::is_ascii_alphabetic) {
            vector[usize::from(b.to_ascii_lowercase() - b'a')] += 1.0;
        }
        Ok(vector)
    }
}

/// An embedder whose provider is always down.
#[derive(Debug)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Err(DomainError::Upstream("embedding provider unavailable".into()))
    }
}
