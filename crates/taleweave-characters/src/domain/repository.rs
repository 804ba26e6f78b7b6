//! Persistence port for characters.

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::character::Character;

/// Storage for characters.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Inserts a new character.
    async fn insert(&self, character: &Character) -> Result<(), DomainError>;
    /// Overwrites an existing character.
    async fn save(&self, character: &Character) -> Result<(), DomainError>;
    /// Finds a character by id.
    async fn find(&self, id: Uuid) -> Result<Option<Character>, DomainError>;
    /// Deletes a character; returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Lists public characters plus, when given, those created by
    /// `creator_id`, newest first.
    async fn list_visible(&self, creator_id: Option<Uuid>) -> Result<Vec<Character>, DomainError>;
    /// Lists characters created by `creator_id`, newest first.
    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Character>, DomainError>;
    /// Case-insensitive substring search over public character names.
    async fn search_public(&self, query: &str, limit: usize)
    -> Result<Vec<Character>, DomainError>;
}
