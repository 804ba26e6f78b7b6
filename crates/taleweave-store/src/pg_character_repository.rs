//! `PostgreSQL` implementation of `CharacterRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use taleweave_characters::domain::character::Character;
use taleweave_characters::domain::ignition::Ignition;
use taleweave_characters::domain::repository::CharacterRepository;
use taleweave_core::error::DomainError;

use crate::sql::{constraint_or_infrastructure, contains_pattern, infrastructure, sql_limit};

const COLUMNS: &str = "id, creator_id, name, archetype, personality, backstory, speaking_style, \
    boundaries, ignition, is_public, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: Uuid,
    creator_id: Uuid,
    name: String,
    archetype: String,
    personality: String,
    backstory: String,
    speaking_style: String,
    boundaries: Json<Vec<String>>,
    ignition: Option<Json<Ignition>>,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Self {
            id: row.id,
            creator_id: row.creator_id,
            name: row.name,
            archetype: row.archetype,
            personality: row.personality,
            backstory: row.backstory,
            speaking_style: row.speaking_style,
            boundaries: row.boundaries.0,
            ignition: row.ignition.map(|j| j.0),
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed character store.
#[derive(Debug, Clone)]
pub struct PgCharacterRepository {
    pool: PgPool,
}

impl PgCharacterRepository {
    /// Creates a new `PgCharacterRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, query: &str, bind: Option<Uuid>) -> Result<Vec<Character>, DomainError> {
        let rows = sqlx::query_as::<_, CharacterRow>(query)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Character::from).collect())
    }
}

#[async_trait]
impl CharacterRepository for PgCharacterRepository {
    #[instrument(skip_all, fields(character_id = %character.id))]
    async fn insert(&self, character: &Character) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO characters
                (id, creator_id, name, archetype, personality, backstory, speaking_style,
                 boundaries, ignition, is_public, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(character.id)
        .bind(character.creator_id)
        .bind(&character.name)
        .bind(&character.archetype)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(&character.speaking_style)
        .bind(Json(&character.boundaries))
        .bind(character.ignition.as_ref().map(Json))
        .bind(character.is_public)
        .bind(character.created_at)
        .bind(character.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_or_infrastructure(e, "character already exists"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(character_id = %character.id))]
    async fn save(&self, character: &Character) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE characters
             SET name = $2, archetype = $3, personality = $4, backstory = $5,
                 speaking_style = $6, boundaries = $7, ignition = $8, is_public = $9,
                 updated_at = $10
             WHERE id = $1",
        )
        .bind(character.id)
        .bind(&character.name)
        .bind(&character.archetype)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(&character.speaking_style)
        .bind(Json(&character.boundaries))
        .bind(character.ignition.as_ref().map(Json))
        .bind(character.is_public)
        .bind(character.updated_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Character>, DomainError> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        let row = sqlx::query_as::<_, CharacterRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(Character::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_visible(&self, creator_id: Option<Uuid>) -> Result<Vec<Character>, DomainError> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE is_public OR creator_id = $1
             ORDER BY created_at DESC"
        );
        self.fetch(&query, creator_id).await
    }

    async fn list_by_creator(&self, creator_id: Uuid) -> Result<Vec<Character>, DomainError> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters WHERE creator_id = $1 ORDER BY created_at DESC"
        );
        self.fetch(&query, Some(creator_id)).await
    }

    #[instrument(skip(self))]
    async fn search_public(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Character>, DomainError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE is_public AND name ILIKE $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, CharacterRow>(&sql)
            .bind(contains_pattern(query))
            .bind(sql_limit(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Character::from).collect())
    }
}
