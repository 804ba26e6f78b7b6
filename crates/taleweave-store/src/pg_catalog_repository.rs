//! `PostgreSQL` implementation of `CatalogRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use taleweave_catalog::domain::episode::{Beat, EpisodeTemplate};
use taleweave_catalog::domain::image::{Image, ImageOwnerKind};
use taleweave_catalog::domain::repository::{CatalogMatches, CatalogRepository};
use taleweave_catalog::domain::series::{Series, SeriesFilter, SeriesType};
use taleweave_catalog::domain::world::World;
use taleweave_core::error::DomainError;

use crate::sql::{constraint_or_infrastructure, contains_pattern, infrastructure, sql_limit};

const WORLD_COLUMNS: &str = "id, name, slug, description, default_scenes, tone, \
    ambient_details, metadata, is_active, created_at";

const SERIES_COLUMNS: &str =
    "id, world_id, title, slug, tagline, series_type, is_published, content_hash, created_at";

const EPISODE_COLUMNS: &str = "id, series_id, episode_number, title, situation, character_id, \
    beats, is_published, created_at";

const IMAGE_COLUMNS: &str =
    "id, owner_kind, owner_id, purpose, storage_key, mime_type, width, height, prompt, created_at";

#[derive(sqlx::FromRow)]
struct WorldRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    default_scenes: Vec<String>,
    tone: Option<String>,
    ambient_details: serde_json::Value,
    metadata: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<WorldRow> for World {
    fn from(row: WorldRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            default_scenes: row.default_scenes,
            tone: row.tone,
            ambient_details: row.ambient_details,
            metadata: row.metadata,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeriesRow {
    id: Uuid,
    world_id: Option<Uuid>,
    title: String,
    slug: String,
    tagline: Option<String>,
    series_type: String,
    is_published: bool,
    content_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SeriesRow> for Series {
    type Error = DomainError;

    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        let series_type: SeriesType = row.series_type.parse().map_err(|_| {
            DomainError::Infrastructure(format!("stored series type {:?} is unknown", row.series_type))
        })?;
        Ok(Self {
            id: row.id,
            world_id: row.world_id,
            title: row.title,
            slug: row.slug,
            tagline: row.tagline,
            series_type,
            is_published: row.is_published,
            content_hash: row.content_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EpisodeRow {
    id: Uuid,
    series_id: Uuid,
    episode_number: i32,
    title: String,
    situation: String,
    character_id: Option<Uuid>,
    beats: Json<Vec<Beat>>,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<EpisodeRow> for EpisodeTemplate {
    fn from(row: EpisodeRow) -> Self {
        Self {
            id: row.id,
            series_id: row.series_id,
            episode_number: row.episode_number,
            title: row.title,
            situation: row.situation,
            character_id: row.character_id,
            beats: row.beats.0,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    owner_kind: String,
    owner_id: Uuid,
    purpose: String,
    storage_key: String,
    mime_type: String,
    width: Option<i32>,
    height: Option<i32>,
    prompt: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for Image {
    type Error = DomainError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            DomainError::Infrastructure(format!("stored image {field} {value:?} is unknown"))
        };
        Ok(Self {
            id: row.id,
            owner_kind: row
                .owner_kind
                .parse()
                .map_err(|_| corrupt("owner kind", &row.owner_kind))?,
            owner_id: row.owner_id,
            purpose: row
                .purpose
                .parse()
                .map_err(|_| corrupt("purpose", &row.purpose))?,
            storage_key: row.storage_key,
            mime_type: row.mime_type,
            width: row.width,
            height: row.height,
            prompt: row.prompt,
            created_at: row.created_at,
        })
    }
}

fn all_series(rows: Vec<SeriesRow>) -> Result<Vec<Series>, DomainError> {
    rows.into_iter().map(Series::try_from).collect()
}

async fn insert_world_row(conn: &mut PgConnection, world: &World) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO worlds
            (id, name, slug, description, default_scenes, tone,
             ambient_details, metadata, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(world.id)
    .bind(&world.name)
    .bind(&world.slug)
    .bind(&world.description)
    .bind(&world.default_scenes)
    .bind(&world.tone)
    .bind(&world.ambient_details)
    .bind(&world.metadata)
    .bind(world.is_active)
    .bind(world.created_at)
    .execute(conn)
    .await
    .map_err(|e| constraint_or_infrastructure(e, &format!("world slug {:?} is taken", world.slug)))?;
    Ok(())
}

async fn insert_series_row(conn: &mut PgConnection, series: &Series) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO series
            (id, world_id, title, slug, tagline, series_type, is_published,
             content_hash, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(series.id)
    .bind(series.world_id)
    .bind(&series.title)
    .bind(&series.slug)
    .bind(&series.tagline)
    .bind(series.series_type.as_str())
    .bind(series.is_published)
    .bind(&series.content_hash)
    .bind(series.created_at)
    .execute(conn)
    .await
    .map_err(|e| {
        constraint_or_infrastructure(e, &format!("series slug {:?} is taken", series.slug))
    })?;
    Ok(())
}

async fn insert_episode_row(
    conn: &mut PgConnection,
    episode: &EpisodeTemplate,
) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO episode_templates
            (id, series_id, episode_number, title, situation, character_id,
             beats, is_published, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(episode.id)
    .bind(episode.series_id)
    .bind(episode.episode_number)
    .bind(&episode.title)
    .bind(&episode.situation)
    .bind(episode.character_id)
    .bind(Json(&episode.beats))
    .bind(episode.is_published)
    .bind(episode.created_at)
    .execute(conn)
    .await
    .map_err(|e| {
        constraint_or_infrastructure(
            e,
            &format!(
                "episode {} already exists in this series",
                episode.episode_number
            ),
        )
    })?;
    Ok(())
}

/// PostgreSQL-backed catalog.
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Creates a new `PgCatalogRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip_all, fields(world_id = %world.id))]
    async fn insert_world(&self, world: &World) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(infrastructure)?;
        insert_world_row(&mut conn, world).await
    }

    #[instrument(skip_all, fields(world_id = %world.id))]
    async fn save_world(&self, world: &World) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE worlds
             SET name = $2, description = $3, default_scenes = $4, tone = $5,
                 ambient_details = $6, metadata = $7, is_active = $8
             WHERE id = $1",
        )
        .bind(world.id)
        .bind(&world.name)
        .bind(&world.description)
        .bind(&world.default_scenes)
        .bind(&world.tone)
        .bind(&world.ambient_details)
        .bind(&world.metadata)
        .bind(world.is_active)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn find_world(&self, id: Uuid) -> Result<Option<World>, DomainError> {
        let query = format!("SELECT {WORLD_COLUMNS} FROM worlds WHERE id = $1");
        let row = sqlx::query_as::<_, WorldRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(World::from))
    }

    async fn find_world_by_slug(&self, slug: &str) -> Result<Option<World>, DomainError> {
        let query = format!("SELECT {WORLD_COLUMNS} FROM worlds WHERE slug = $1");
        let row = sqlx::query_as::<_, WorldRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(World::from))
    }

    async fn list_worlds(&self, include_inactive: bool) -> Result<Vec<World>, DomainError> {
        let query = format!(
            "SELECT {WORLD_COLUMNS} FROM worlds WHERE $1 OR is_active ORDER BY name, created_at"
        );
        let rows = sqlx::query_as::<_, WorldRow>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(World::from).collect())
    }

    #[instrument(skip_all, fields(series_id = %series.id))]
    async fn insert_series(&self, series: &Series) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(infrastructure)?;
        insert_series_row(&mut conn, series).await
    }

    #[instrument(skip_all, fields(series_id = %series.id, episodes = episodes.len()))]
    async fn insert_series_with_episodes(
        &self,
        world: Option<&World>,
        series: &Series,
        episodes: &[EpisodeTemplate],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        if let Some(world) = world {
            insert_world_row(&mut tx, world).await?;
        }
        insert_series_row(&mut tx, series).await?;
        for episode in episodes {
            insert_episode_row(&mut tx, episode).await?;
        }
        tx.commit().await.map_err(infrastructure)?;
        Ok(())
    }

    #[instrument(skip_all, fields(series_id = %series.id))]
    async fn save_series(&self, series: &Series) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE series
             SET title = $2, tagline = $3, series_type = $4, is_published = $5,
                 content_hash = $6
             WHERE id = $1",
        )
        .bind(series.id)
        .bind(&series.title)
        .bind(&series.tagline)
        .bind(series.series_type.as_str())
        .bind(series.is_published)
        .bind(&series.content_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_or_infrastructure(e, "series update conflicts with another series"))?;
        Ok(())
    }

    async fn find_series(&self, id: Uuid) -> Result<Option<Series>, DomainError> {
        let query = format!("SELECT {SERIES_COLUMNS} FROM series WHERE id = $1");
        sqlx::query_as::<_, SeriesRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?
            .map(Series::try_from)
            .transpose()
    }

    async fn find_series_by_slug(&self, slug: &str) -> Result<Option<Series>, DomainError> {
        let query = format!("SELECT {SERIES_COLUMNS} FROM series WHERE slug = $1");
        sqlx::query_as::<_, SeriesRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?
            .map(Series::try_from)
            .transpose()
    }

    async fn list_series(&self, filter: &SeriesFilter) -> Result<Vec<Series>, DomainError> {
        let query = format!(
            "SELECT {SERIES_COLUMNS} FROM series
             WHERE ($1 OR is_published)
               AND ($2::text IS NULL OR series_type = $2)
               AND ($3::uuid IS NULL OR world_id = $3)
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SeriesRow>(&query)
            .bind(filter.include_unpublished)
            .bind(filter.series_type.map(SeriesType::as_str))
            .bind(filter.world_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        all_series(rows)
    }

    #[instrument(skip_all, fields(episode_id = %episode.id))]
    async fn insert_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(infrastructure)?;
        insert_episode_row(&mut conn, episode).await
    }

    #[instrument(skip_all, fields(episode_id = %episode.id))]
    async fn save_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE episode_templates
             SET title = $2, situation = $3, character_id = $4, beats = $5, is_published = $6
             WHERE id = $1",
        )
        .bind(episode.id)
        .bind(&episode.title)
        .bind(&episode.situation)
        .bind(episode.character_id)
        .bind(Json(&episode.beats))
        .bind(episode.is_published)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn find_episode(&self, id: Uuid) -> Result<Option<EpisodeTemplate>, DomainError> {
        let query = format!("SELECT {EPISODE_COLUMNS} FROM episode_templates WHERE id = $1");
        let row = sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(EpisodeTemplate::from))
    }

    async fn list_episodes(&self, series_id: Uuid) -> Result<Vec<EpisodeTemplate>, DomainError> {
        let query = format!(
            "SELECT {EPISODE_COLUMNS} FROM episode_templates
             WHERE series_id = $1
             ORDER BY episode_number"
        );
        let rows = sqlx::query_as::<_, EpisodeRow>(&query)
            .bind(series_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(EpisodeTemplate::from).collect())
    }

    async fn list_playable_episodes(&self) -> Result<Vec<EpisodeTemplate>, DomainError> {
        let rows = sqlx::query_as::<_, EpisodeRow>(
            "SELECT e.id, e.series_id, e.episode_number, e.title, e.situation, e.character_id,
                    e.beats, e.is_published, e.created_at
             FROM episode_templates e
             JOIN series s ON s.id = e.series_id
             WHERE e.is_published AND s.is_published AND s.series_type = $1
             ORDER BY s.created_at, e.series_id, e.episode_number",
        )
        .bind(SeriesType::Play.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(rows.into_iter().map(EpisodeTemplate::from).collect())
    }

    #[instrument(skip_all, fields(image_id = %image.id))]
    async fn insert_image(&self, image: &Image) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO images
                (id, owner_kind, owner_id, purpose, storage_key, mime_type,
                 width, height, prompt, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(image.id)
        .bind(image.owner_kind.as_str())
        .bind(image.owner_id)
        .bind(image.purpose.as_str())
        .bind(&image.storage_key)
        .bind(&image.mime_type)
        .bind(image.width)
        .bind(image.height)
        .bind(&image.prompt)
        .bind(image.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_or_infrastructure(e, "image already registered"))?;
        Ok(())
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<Image>, DomainError> {
        let query = format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?
            .map(Image::try_from)
            .transpose()
    }

    async fn list_images(
        &self,
        owner_kind: ImageOwnerKind,
        owner_id: Uuid,
    ) -> Result<Vec<Image>, DomainError> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM images
             WHERE owner_kind = $1 AND owner_id = $2
             ORDER BY created_at"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(owner_kind.as_str())
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?
            .into_iter()
            .map(Image::try_from)
            .collect()
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<CatalogMatches, DomainError> {
        let pattern = contains_pattern(query);
        let limit = sql_limit(limit);

        let world_query = format!(
            "SELECT {WORLD_COLUMNS} FROM worlds
             WHERE is_active AND name ILIKE $1
             ORDER BY name
             LIMIT $2"
        );
        let worlds = sqlx::query_as::<_, WorldRow>(&world_query)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        let series_query = format!(
            "SELECT {SERIES_COLUMNS} FROM series
             WHERE is_published AND title ILIKE $1
             ORDER BY title
             LIMIT $2"
        );
        let series = sqlx::query_as::<_, SeriesRow>(&series_query)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        Ok(CatalogMatches {
            worlds: worlds.into_iter().map(World::from).collect(),
            series: all_series(series)?,
        })
    }
}
