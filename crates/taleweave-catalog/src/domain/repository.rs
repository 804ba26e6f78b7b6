//! Persistence port for the catalog context.

use async_trait::async_trait;
use serde::Serialize;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::episode::EpisodeTemplate;
use super::image::{Image, ImageOwnerKind};
use super::series::{Series, SeriesFilter};
use super::world::World;

/// Catalog records matching a search query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogMatches {
    /// Matching active worlds.
    pub worlds: Vec<World>,
    /// Matching published series.
    pub series: Vec<Series>,
}

/// Storage for worlds, series, episode templates and images.
///
/// Inserts of a duplicate slug (or duplicate episode number within a series)
/// fail with `DomainError::Validation`.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Inserts a new world.
    async fn insert_world(&self, world: &World) -> Result<(), DomainError>;
    /// Overwrites an existing world.
    async fn save_world(&self, world: &World) -> Result<(), DomainError>;
    /// Finds a world by id.
    async fn find_world(&self, id: Uuid) -> Result<Option<World>, DomainError>;
    /// Finds a world by slug.
    async fn find_world_by_slug(&self, slug: &str) -> Result<Option<World>, DomainError>;
    /// Lists worlds ordered by name.
    async fn list_worlds(&self, include_inactive: bool) -> Result<Vec<World>, DomainError>;

    /// Inserts a new series.
    async fn insert_series(&self, series: &Series) -> Result<(), DomainError>;
    /// Overwrites an existing series.
    async fn save_series(&self, series: &Series) -> Result<(), DomainError>;
    /// Finds a series by id.
    async fn find_series(&self, id: Uuid) -> Result<Option<Series>, DomainError>;
    /// Finds a series by slug.
    async fn find_series_by_slug(&self, slug: &str) -> Result<Option<Series>, DomainError>;
    /// Inserts a series with its episode templates, and `world` when given,
    /// as one unit: on any failure nothing is stored.
    async fn insert_series_with_episodes(
        &self,
        world: Option<&World>,
        series: &Series,
        episodes: &[EpisodeTemplate],
    ) -> Result<(), DomainError>;
    /// Lists series matching `filter`, newest first.
    async fn list_series(&self, filter: &SeriesFilter) -> Result<Vec<Series>, DomainError>;

    /// Inserts a new episode template.
    async fn insert_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError>;
    /// Overwrites an existing episode template.
    async fn save_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError>;
    /// Finds an episode template by id.
    async fn find_episode(&self, id: Uuid) -> Result<Option<EpisodeTemplate>, DomainError>;
    /// Lists a series' episode templates by episode number.
    async fn list_episodes(&self, series_id: Uuid) -> Result<Vec<EpisodeTemplate>, DomainError>;
    /// Lists published templates of published `play` series.
    async fn list_playable_episodes(&self) -> Result<Vec<EpisodeTemplate>, DomainError>;

    /// Inserts image metadata.
    async fn insert_image(&self, image: &Image) -> Result<(), DomainError>;
    /// Finds image metadata by id.
    async fn find_image(&self, id: Uuid) -> Result<Option<Image>, DomainError>;
    /// Lists images attached to a record, oldest first.
    async fn list_images(
        &self,
        owner_kind: ImageOwnerKind,
        owner_id: Uuid,
    ) -> Result<Vec<Image>, DomainError>;
    /// Deletes image metadata; returns whether a row was removed.
    async fn delete_image(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Case-insensitive substring search over world names and series titles.
    async fn search(&self, query: &str, limit: usize) -> Result<CatalogMatches, DomainError>;
}
