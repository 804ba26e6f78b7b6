//! Persistence port for memories.

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use taleweave_core::identity::Owner;
use uuid::Uuid;

use super::memory::Memory;

/// Storage for memories.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Inserts a new memory.
    async fn insert(&self, memory: &Memory) -> Result<(), DomainError>;
    /// Stores the embedding of an existing memory. A memory deleted in the
    /// meantime is ignored.
    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), DomainError>;
    /// Finds a memory by id.
    async fn find(&self, id: Uuid) -> Result<Option<Memory>, DomainError>;
    /// Lists an owner's memories about one character.
    async fn list_for(&self, owner: &Owner, character_id: Uuid)
    -> Result<Vec<Memory>, DomainError>;
    /// Deletes a memory; returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
