//! In-memory `CharacterRepository` used by tests and local tooling.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use crate::domain::character::Character;
use crate::domain::repository::CharacterRepository;

/// Characters held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCharacterRepository {
    rows: Mutex<Vec<Character>>,
}

impl InMemoryCharacterRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<Character>>, DomainError> {
        self.rows
            .lock()
            .map_err(|_| DomainError::Infrastructure("character lock poisoned".into()))
    }

    fn newest_first(&self, keep: impl Fn(&Character) -> bool) -> Result<Vec<Character>, DomainError> {
        let mut found: Vec<Character> = self.rows()?.iter().filter(|c| keep(c)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn insert(&self, character: &Character) -> Result<(), DomainError> {
        self.rows()?.push(character.clone());
        Ok(())
    }

    async fn save(&self, character: &Character) -> Result<(), DomainError> {
        let mut rows = self.rows()?;
        let slot = rows
            .iter_mut()
            .find(|c| c.id == character.id)
            .ok_or_else(|| DomainError::not_found("character", character.id))?;
        *slot = character.clone();
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Character>, DomainError> {
        Ok(self.rows()?.iter().find(|c| c.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok(rows.len() != before)
    }

    async fn list_visible(&self, creator_id: Option<Uuid>) -> Result<Vec<Character>, DomainError> {
        self.newest_first(|c| c.is_public || Some(c.creator_id) == creator_id)
    }

    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Character>, DomainError> {
        self.newest_first(|c| c.creator_id == creator_id)
    }

    async fn search_public(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Character>, DomainError> {
        let needle = query.to_lowercase();
        let mut found = self.newest_first(|c| c.is_public && c.name.to_lowercase().contains(&needle))?;
        found.truncate(limit);
        Ok(found)
    }
}
