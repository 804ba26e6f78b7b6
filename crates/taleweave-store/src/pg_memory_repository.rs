//! `PostgreSQL` implementation of `MemoryRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use taleweave_core::error::DomainError;
use taleweave_core::identity::Owner;
use taleweave_memory::domain::memory::Memory;
use taleweave_memory::domain::repository::MemoryRepository;

use crate::sql::{constraint_or_infrastructure, infrastructure};

const COLUMNS: &str =
    "id, user_id, guest_session_id, character_id, content, importance, embedding, created_at";

#[derive(sqlx::FromRow)]
struct MemoryRow {
    id: Uuid,
    user_id: Uuid,
    guest_session_id: Option<String>,
    character_id: Uuid,
    content: String,
    importance: i16,
    embedding: Option<Vec<f32>>,
    created_at: DateTime<Utc>,
}

impl From<MemoryRow> for Memory {
    fn from(row: MemoryRow) -> Self {
        Self {
            id: row.id,
            owner: Owner {
                user_id: row.user_id,
                guest_session_id: row.guest_session_id,
            },
            character_id: row.character_id,
            content: row.content,
            importance: row.importance,
            embedding: row.embedding,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed memory store. Embeddings are kept as `REAL[]` and
/// ranked in process.
#[derive(Debug, Clone)]
pub struct PgMemoryRepository {
    pool: PgPool,
}

impl PgMemoryRepository {
    /// Creates a new `PgMemoryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoryRepository for PgMemoryRepository {
    #[instrument(skip_all, fields(memory_id = %memory.id))]
    async fn insert(&self, memory: &Memory) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO memories
                (id, user_id, guest_session_id, character_id, content, importance,
                 embedding, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(memory.id)
        .bind(memory.owner.user_id)
        .bind(&memory.owner.guest_session_id)
        .bind(memory.character_id)
        .bind(&memory.content)
        .bind(memory.importance)
        .bind(&memory.embedding)
        .bind(memory.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_or_infrastructure(e, "memory already exists"))?;
        Ok(())
    }

    #[instrument(skip(self, embedding), fields(dimensions = embedding.len()))]
    async fn set_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), DomainError> {
        sqlx::query("UPDATE memories SET embedding = $2 WHERE id = $1")
            .bind(id)
            .bind(embedding)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Memory>, DomainError> {
        let query = format!("SELECT {COLUMNS} FROM memories WHERE id = $1");
        let row = sqlx::query_as::<_, MemoryRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(Memory::from))
    }

    async fn list_for(
        &self,
        owner: &Owner,
        character_id: Uuid,
    ) -> Result<Vec<Memory>, DomainError> {
        let query = format!(
            "SELECT {COLUMNS} FROM memories
             WHERE user_id = $1
               AND guest_session_id IS NOT DISTINCT FROM $2
               AND character_id = $3
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, MemoryRow>(&query)
            .bind(owner.user_id)
            .bind(&owner.guest_session_id)
            .bind(character_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Memory::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(result.rows_affected() > 0)
    }
}
