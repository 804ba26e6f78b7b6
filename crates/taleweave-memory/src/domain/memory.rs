//! Memories.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleweave_core::error::DomainError;
use taleweave_core::identity::Owner;
use uuid::Uuid;

/// Longest accepted memory, in characters.
pub const MAX_MEMORY_CHARS: usize = 2000;

/// Importance used when none is given.
pub const DEFAULT_IMPORTANCE: i16 = 5;

/// Accepted importance range.
pub const IMPORTANCE_RANGE: std::ops::RangeInclusive<i16> = 1..=10;

/// Something a character remembers about a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Memory {
    /// Memory identifier.
    pub id: Uuid,
    /// Whose memory this is.
    #[serde(flatten)]
    pub owner: Owner,
    /// The character that remembers.
    pub character_id: Uuid,
    /// What is remembered.
    pub content: String,
    /// 1 (trivia) to 10 (defining).
    pub importance: i16,
    /// Vector embedding, once computed.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// Builds a validated memory without an embedding.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for empty or oversized content or an
    /// importance outside 1..=10.
    pub fn create(
        owner: Owner,
        character_id: Uuid,
        content: &str,
        importance: Option<i16>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let content = content.trim();
        if content.is_empty() || content.chars().count() > MAX_MEMORY_CHARS {
            return Err(DomainError::Validation(format!(
                "memory must be 1..={MAX_MEMORY_CHARS} characters"
            )));
        }
        let importance = importance.unwrap_or(DEFAULT_IMPORTANCE);
        if !IMPORTANCE_RANGE.contains(&importance) {
            return Err(DomainError::Validation(format!(
                "importance must be between 1 and 10, got {importance}"
            )));
        }
        Ok(Self {
            id,
            owner,
            character_id,
            content: content.to_owned(),
            importance,
            embedding: None,
            created_at: now,
        })
    }

    /// Whether the embedding has been stored.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }
}
