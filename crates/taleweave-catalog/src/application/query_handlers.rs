//! Query handlers for the catalog context.

use serde::Serialize;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use crate::domain::episode::EpisodeTemplate;
use crate::domain::image::{Image, ImageOwnerKind};
use crate::domain::repository::{CatalogMatches, CatalogRepository};
use crate::domain::series::{Series, SeriesFilter};
use crate::domain::world::World;

/// Shortest accepted search query.
pub const MIN_SEARCH_LEN: usize = 2;

/// Most results returned per record kind by a search.
pub const SEARCH_LIMIT: usize = 20;

/// Image metadata together with its public URL.
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    /// The stored metadata.
    #[serde(flatten)]
    pub image: Image,
    /// Where clients fetch the bytes.
    pub url: String,
}

impl ImageView {
    /// Wraps `image` with a URL under `asset_base_url`.
    #[must_use]
    pub fn new(image: Image, asset_base_url: &str) -> Self {
        let url = image.public_url(asset_base_url);
        Self { image, url }
    }
}

/// Looks up a world by id. Inactive worlds are only returned when
/// `include_inactive` is set.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no visible world has that id.
pub async fn get_world(
    world_id: Uuid,
    include_inactive: bool,
    repo: &dyn CatalogRepository,
) -> Result<World, DomainError> {
    repo.find_world(world_id)
        .await?
        .filter(|w| include_inactive || w.is_active)
        .ok_or_else(|| DomainError::not_found("world", world_id))
}

/// Looks up a world by slug, with the same visibility rule as [`get_world`].
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no visible world has that slug.
pub async fn get_world_by_slug(
    slug: &str,
    include_inactive: bool,
    repo: &dyn CatalogRepository,
) -> Result<World, DomainError> {
    repo.find_world_by_slug(slug)
        .await?
        .filter(|w| include_inactive || w.is_active)
        .ok_or_else(|| DomainError::not_found("world", slug))
}

/// Lists worlds ordered by name.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_worlds(
    include_inactive: bool,
    repo: &dyn CatalogRepository,
) -> Result<Vec<World>, DomainError> {
    repo.list_worlds(include_inactive).await
}

/// Looks up a series. Unpublished series are only returned when
/// `include_unpublished` is set.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no visible series has that id.
pub async fn get_series(
    series_id: Uuid,
    include_unpublished: bool,
    repo: &dyn CatalogRepository,
) -> Result<Series, DomainError> {
    repo.find_series(series_id)
        .await?
        .filter(|s| include_unpublished || s.is_published)
        .ok_or_else(|| DomainError::not_found("series", series_id))
}

/// Lists series matching `filter`, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_series(
    filter: &SeriesFilter,
    repo: &dyn CatalogRepository,
) -> Result<Vec<Series>, DomainError> {
    repo.list_series(filter).await
}

/// Lists the episode templates of a visible series. Unpublished templates
/// are dropped unless `include_unpublished` is set.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the series is not visible.
pub async fn list_episodes(
    series_id: Uuid,
    include_unpublished: bool,
    repo: &dyn CatalogRepository,
) -> Result<Vec<EpisodeTemplate>, DomainError> {
    get_series(series_id, include_unpublished, repo).await?;
    let mut episodes = repo.list_episodes(series_id).await?;
    if !include_unpublished {
        episodes.retain(|e| e.is_published);
    }
    Ok(episodes)
}

/// Looks up an episode template.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no visible template has that id.
pub async fn get_episode(
    episode_id: Uuid,
    include_unpublished: bool,
    repo: &dyn CatalogRepository,
) -> Result<EpisodeTemplate, DomainError> {
    repo.find_episode(episode_id)
        .await?
        .filter(|e| include_unpublished || e.is_published)
        .ok_or_else(|| DomainError::not_found("episode template", episode_id))
}

/// Lists published templates of published `play` series.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_games(repo: &dyn CatalogRepository) -> Result<Vec<EpisodeTemplate>, DomainError> {
    repo.list_playable_episodes().await
}

/// Looks up one image.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no image has that id.
pub async fn get_image(
    image_id: Uuid,
    asset_base_url: &str,
    repo: &dyn CatalogRepository,
) -> Result<ImageView, DomainError> {
    let image = repo
        .find_image(image_id)
        .await?
        .ok_or_else(|| DomainError::not_found("image", image_id))?;
    Ok(ImageView::new(image, asset_base_url))
}

/// Lists images attached to a record.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_images(
    owner_kind: ImageOwnerKind,
    owner_id: Uuid,
    asset_base_url: &str,
    repo: &dyn CatalogRepository,
) -> Result<Vec<ImageView>, DomainError> {
    Ok(repo
        .list_images(owner_kind, owner_id)
        .await?
        .into_iter()
        .map(|i| ImageView::new(i, asset_base_url))
        .collect())
}

/// Trims a search query and checks its length.
///
/// # Errors
///
/// Returns `DomainError::Validation` for queries shorter than
/// [`MIN_SEARCH_LEN`] characters.
pub fn normalize_query(query: &str) -> Result<&str, DomainError> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Err(DomainError::Validation(format!(
            "search query must be at least {MIN_SEARCH_LEN} characters"
        )));
    }
    Ok(query)
}

/// Searches active worlds and published series.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a too-short query.
pub async fn search(
    query: &str,
    repo: &dyn CatalogRepository,
) -> Result<CatalogMatches, DomainError> {
    let query = normalize_query(query)?;
    repo.search(query, SEARCH_LIMIT).await
}
