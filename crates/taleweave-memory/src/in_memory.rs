//! In-memory `MemoryRepository` used by tests and local tooling.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use taleweave_core::identity::Owner;
use uuid::Uuid;

use crate::domain::memory::Memory;
use crate::domain::repository::MemoryRepository;

/// Memories held in memory.
#[derive(Debug, Default)]
pub struct InMemoryMemoryRepository {
    rows: Mutex<Vec<Memory>>,
}

impl InMemoryMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Memory>>, DomainError> {
        self.rows
            .lock()
            .map_err(|_| DomainError::Infrastructure("memory lock poisoned".into()))
    }
}

#[async_trait]
impl MemoryRepository for InMemoryMemoryRepository {
    async fn insert(&self, memory: &Memory) -> Result<(), DomainError> {
        self.rows()?.push(memory.clone());
        Ok(())
    }

    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), DomainError> {
        if let Some(row) = self.rows()?.iter_mut().find(|m| m.id == id) {
            row.embedding = Some(embedding.to_vec());
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Memory>, DomainError> {
        Ok(self.rows()?.iter().find(|m| m.id == id).cloned())
    }

    async fn list_for(
        &self,
        owner: &Owner,
        character_id: Uuid,
    ) -> Result<Vec<Memory>, DomainError> {
        Ok(self
            .rows()?
            .iter()
            .filter(|m| &m.owner == owner && m.character_id == character_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|m| m.id != id);
        Ok(rows.len() != before)
    }
}
