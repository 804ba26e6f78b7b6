//! In-memory `CatalogRepository` used by tests and local tooling.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use crate::domain::episode::EpisodeTemplate;
use crate::domain::image::{Image, ImageOwnerKind};
use crate::domain::repository::{CatalogMatches, CatalogRepository};
use crate::domain::series::{Series, SeriesFilter, SeriesType};
use crate::domain::world::World;

#[derive(Debug, Default)]
struct Tables {
    worlds: Vec<World>,
    series: Vec<Series>,
    episodes: Vec<EpisodeTemplate>,
    images: Vec<Image>,
}

/// A catalog held in memory with the same uniqueness rules as PostgreSQL.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    tables: Mutex<Tables>,
}

impl InMemoryCatalogRepository {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|_| DomainError::Infrastructure("catalog lock poisoned".into()))
    }
}

impl Tables {
    fn check_world_slug(&self, world: &World) -> Result<(), DomainError> {
        if self.worlds.iter().any(|w| w.slug == world.slug) {
            return Err(DomainError::Validation(format!(
                "world slug {:?} is taken",
                world.slug
            )));
        }
        Ok(())
    }

    fn check_series_slug(&self, series: &Series) -> Result<(), DomainError> {
        if self.series.iter().any(|s| s.slug == series.slug) {
            return Err(DomainError::Validation(format!(
                "series slug {:?} is taken",
                series.slug
            )));
        }
        Ok(())
    }

    fn check_episode_number(&self, episode: &EpisodeTemplate) -> Result<(), DomainError> {
        if self.episodes.iter().any(|e| {
            e.series_id == episode.series_id && e.episode_number == episode.episode_number
        }) {
            return Err(DomainError::Validation(format!(
                "episode {} already exists in this series",
                episode.episode_number
            )));
        }
        Ok(())
    }
}

fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) -> Result<(), DomainError> {
    let slot = rows
        .iter_mut()
        .find(|r| same(r))
        .ok_or_else(|| DomainError::Infrastructure("row vanished before save".into()))?;
    *slot = row.clone();
    Ok(())
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn insert_world(&self, world: &World) -> Result<(), DomainError> {
        let mut t = self.tables()?;
        t.check_world_slug(world)?;
        t.worlds.push(world.clone());
        Ok(())
    }

    async fn save_world(&self, world: &World) -> Result<(), DomainError> {
        replace(&mut self.tables()?.worlds, world, |w| w.id == world.id)
    }

    async fn find_world(&self, id: Uuid) -> Result<Option<World>, DomainError> {
        Ok(self.tables()?.worlds.iter().find(|w| w.id == id).cloned())
    }

    async fn find_world_by_slug(&self, slug: &str) -> Result<Option<World>, DomainError> {
        Ok(self.tables()?.worlds.iter().find(|w| w.slug == slug).cloned())
    }

    async fn list_worlds(&self, include_inactive: bool) -> Result<Vec<World>, DomainError> {
        let mut worlds: Vec<World> = self
            .tables()?
            .worlds
            .iter()
            .filter(|w| include_inactive || w.is_active)
            .cloned()
            .collect();
        worlds.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(worlds)
    }

    async fn insert_series(&self, series: &Series) -> Result<(), DomainError> {
        let mut t = self.tables()?;
        t.check_series_slug(series)?;
        t.series.push(series.clone());
        Ok(())
    }

    async fn insert_series_with_episodes(
        &self,
        world: Option<&World>,
        series: &Series,
        episodes: &[EpisodeTemplate],
    ) -> Result<(), DomainError> {
        let mut t = self.tables()?;
        if let Some(world) = world {
            t.check_world_slug(world)?;
        }
        t.check_series_slug(series)?;
        for (i, episode) in episodes.iter().enumerate() {
            t.check_episode_number(episode)?;
            if episodes[..i]
                .iter()
                .any(|e| e.episode_number == episode.episode_number)
            {
                return Err(DomainError::Validation(format!(
                    "episode {} already exists in this series",
                    episode.episode_number
                )));
            }
        }

        if let Some(world) = world {
            t.worlds.push(world.clone());
        }
        t.series.push(series.clone());
        t.episodes.extend_from_slice(episodes);
        Ok(())
    }

    async fn save_series(&self, series: &Series) -> Result<(), DomainError> {
        replace(&mut self.tables()?.series, series, |s| s.id == series.id)
    }

    async fn find_series(&self, id: Uuid) -> Result<Option<Series>, DomainError> {
        Ok(self.tables()?.series.iter().find(|s| s.id == id).cloned())
    }

    async fn find_series_by_slug(&self, slug: &str) -> Result<Option<Series>, DomainError> {
        Ok(self.tables()?.series.iter().find(|s| s.slug == slug).cloned())
    }

    async fn list_series(&self, filter: &SeriesFilter) -> Result<Vec<Series>, DomainError> {
        let mut series: Vec<Series> = self
            .tables()?
            .series
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        series.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(series)
    }

    async fn insert_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError> {
        let mut t = self.tables()?;
        t.check_episode_number(episode)?;
        t.episodes.push(episode.clone());
        Ok(())
    }

    async fn save_episode(&self, episode: &EpisodeTemplate) -> Result<(), DomainError> {
        replace(&mut self.tables()?.episodes, episode, |e| e.id == episode.id)
    }

    async fn find_episode(&self, id: Uuid) -> Result<Option<EpisodeTemplate>, DomainError> {
        Ok(self.tables()?.episodes.iter().find(|e| e.id == id).cloned())
    }

    async fn list_episodes(&self, series_id: Uuid) -> Result<Vec<EpisodeTemplate>, DomainError> {
        let mut episodes: Vec<EpisodeTemplate> = self
            .tables()?
            .episodes
            .iter()
            .filter(|e| e.series_id == series_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|e| e.episode_number);
        Ok(episodes)
    }

    async fn list_playable_episodes(&self) -> Result<Vec<EpisodeTemplate>, DomainError> {
        let t = self.tables()?;
        let mut episodes: Vec<EpisodeTemplate> = t
            .episodes
            .iter()
            .filter(|e| {
                e.is_published
                    && t.series.iter().any(|s| {
                        s.id == e.series_id && s.is_published && s.series_type == SeriesType::Play
                    })
            })
            .cloned()
            .collect();
        episodes.sort_by_key(|e| (e.series_id, e.episode_number));
        Ok(episodes)
    }

    async fn insert_image(&self, image: &Image) -> Result<(), DomainError> {
        self.tables()?.images.push(image.clone());
        Ok(())
    }

    async fn find_image(&self, id: Uuid) -> Result<Option<Image>, DomainError> {
        Ok(self.tables()?.images.iter().find(|i| i.id == id).cloned())
    }

    async fn list_images(
        &self,
        owner_kind: ImageOwnerKind,
        owner_id: Uuid,
    ) -> Result<Vec<Image>, DomainError> {
        Ok(self
            .tables()?
            .images
            .iter()
            .filter(|i| i.owner_kind == owner_kind && i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut t = self.tables()?;
        let before = t.images.len();
        t.images.retain(|i| i.id != id);
        Ok(t.images.len() != before)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<CatalogMatches, DomainError> {
        let needle = query.to_lowercase();
        let t = self.tables()?;
        Ok(CatalogMatches {
            worlds: t
                .worlds
                .iter()
                .filter(|w| w.is_active && w.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect(),
            series: t
                .series
                .iter()
                .filter(|s| s.is_published && s.title.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect(),
        })
    }
}
