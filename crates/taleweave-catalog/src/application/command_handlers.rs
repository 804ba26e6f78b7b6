//! Command handlers for the catalog context.
//!
//! Handlers validate input through the domain types, then write through the
//! `CatalogRepository` port. Each write is a single repository call; a content
//! pack is validated in full and then stored with one atomic insert.

use serde::Serialize;
use taleweave_core::clock::Clock;
use taleweave_core::command::Command;
use taleweave_core::error::DomainError;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::{
    CreateEpisodeTemplate, CreateSeries, CreateWorld, DeleteImage, ImportContentPack,
    PublishEpisodeTemplate, PublishSeries, RegisterImage, UpdateSeries, UpdateWorld,
};
use crate::domain::content_pack::compile_content_pack;
use crate::domain::episode::{EpisodeTemplate, NewEpisodeTemplate};
use crate::domain::image::Image;
use crate::domain::repository::CatalogRepository;
use crate::domain::series::{NewSeries, Series};
use crate::domain::slug::resolve_slug;
use crate::domain::world::World;

fn log_handled(command: &dyn Command, entity_id: Uuid) {
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        %entity_id,
        "catalog command handled"
    );
}

/// Handles `CreateWorld`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for bad input or a taken slug.
pub async fn handle_create_world(
    command: &CreateWorld,
    clock: &dyn Clock,
    repo: &dyn CatalogRepository,
) -> Result<World, DomainError> {
    let world = World::create(command.input.clone(), Uuid::now_v7(), clock.now())?;
    repo.insert_world(&world).await?;
    log_handled(command, world.id);
    Ok(world)
}

/// Handles `UpdateWorld`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown world or
/// `DomainError::Validation` for bad input.
pub async fn handle_update_world(
    command: &UpdateWorld,
    repo: &dyn CatalogRepository,
) -> Result<World, DomainError> {
    let mut world = repo
        .find_world(command.world_id)
        .await?
        .ok_or_else(|| DomainError::not_found("world", command.world_id))?;
    world.apply_update(command.update.clone())?;
    repo.save_world(&world).await?;
    log_handled(command, world.id);
    Ok(world)
}

async fn require_world(repo: &dyn CatalogRepository, world_id: Option<Uuid>) -> Result<(), DomainError> {
    if let Some(id) = world_id {
        repo.find_world(id)
            .await?
            .ok_or_else(|| DomainError::not_found("world", id))?;
    }
    Ok(())
}

/// Handles `CreateSeries`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for bad input (including an unknown
/// series type) or a taken slug, and `DomainError::NotFound` for an unknown
/// world.
pub async fn handle_create_series(
    command: &CreateSeries,
    clock: &dyn Clock,
    repo: &dyn CatalogRepository,
) -> Result<Series, DomainError> {
    let series = Series::create(command.input.clone(), Uuid::now_v7(), clock.now())?;
    require_world(repo, series.world_id).await?;
    repo.insert_series(&series).await?;
    log_handled(command, series.id);
    Ok(series)
}

/// Handles `UpdateSeries`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown series or
/// `DomainError::Validation` for bad input.
pub async fn handle_update_series(
    command: &UpdateSeries,
    repo: &dyn CatalogRepository,
) -> Result<Series, DomainError> {
    let mut series = repo
        .find_series(command.series_id)
        .await?
        .ok_or_else(|| DomainError::not_found("series", command.series_id))?;
    series.apply_update(command.update.clone())?;
    repo.save_series(&series).await?;
    log_handled(command, series.id);
    Ok(series)
}

/// Handles `PublishSeries`. Publishing twice is harmless.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown series.
pub async fn handle_publish_series(
    command: &PublishSeries,
    repo: &dyn CatalogRepository,
) -> Result<Series, DomainError> {
    let mut series = repo
        .find_series(command.series_id)
        .await?
        .ok_or_else(|| DomainError::not_found("series", command.series_id))?;
    if !series.is_published {
        series.is_published = true;
        repo.save_series(&series).await?;
    }
    log_handled(command, series.id);
    Ok(series)
}

/// Handles `CreateEpisodeTemplate`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown series and
/// `DomainError::Validation` for a broken beat contract or a taken episode
/// number.
pub async fn handle_create_episode_template(
    command: &CreateEpisodeTemplate,
    clock: &dyn Clock,
    repo: &dyn CatalogRepository,
) -> Result<EpisodeTemplate, DomainError> {
    repo.find_series(command.input.series_id)
        .await?
        .ok_or_else(|| DomainError::not_found("series", command.input.series_id))?;
    let episode = EpisodeTemplate::create(command.input.clone(), Uuid::now_v7(), clock.now())?;
    repo.insert_episode(&episode).await?;
    log_handled(command, episode.id);
    Ok(episode)
}

/// Handles `PublishEpisodeTemplate`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown template.
pub async fn handle_publish_episode_template(
    command: &PublishEpisodeTemplate,
    repo: &dyn CatalogRepository,
) -> Result<EpisodeTemplate, DomainError> {
    let mut episode = repo
        .find_episode(command.episode_id)
        .await?
        .ok_or_else(|| DomainError::not_found("episode template", command.episode_id))?;
    if !episode.is_published {
        episode.is_published = true;
        repo.save_episode(&episode).await?;
    }
    log_handled(command, episode.id);
    Ok(episode)
}

/// Handles `RegisterImage`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for bad metadata.
pub async fn handle_register_image(
    command: &RegisterImage,
    clock: &dyn Clock,
    repo: &dyn CatalogRepository,
) -> Result<Image, DomainError> {
    let image = Image::create(command.input.clone(), Uuid::now_v7(), clock.now())?;
    repo.insert_image(&image).await?;
    log_handled(command, image.id);
    Ok(image)
}

/// Handles `DeleteImage`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no such image exists.
pub async fn handle_delete_image(
    command: &DeleteImage,
    repo: &dyn CatalogRepository,
) -> Result<(), DomainError> {
    if !repo.delete_image(command.image_id).await? {
        return Err(DomainError::not_found("image", command.image_id));
    }
    log_handled(command, command.image_id);
    Ok(())
}

/// What a content pack import did.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    /// The imported (or already present) series.
    pub series: Series,
    /// The world the series belongs to, if any.
    pub world_id: Option<Uuid>,
    /// Number of episode templates in the series.
    pub episode_count: usize,
    /// `false` when the same document had already been imported.
    pub created: bool,
}

/// Handles `ImportContentPack`: compiles the document and builds its world,
/// series and episodes, then stores them together. Nothing is written unless
/// every record is valid.
///
/// Re-importing a document with the same content hash and series slug is a
/// no-op.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a malformed pack, or when the series
/// slug already exists with different content.
pub async fn handle_import_content_pack(
    command: &ImportContentPack,
    clock: &dyn Clock,
    repo: &dyn CatalogRepository,
) -> Result<ImportOutcome, DomainError> {
    let compiled = compile_content_pack(&command.document)?;
    let pack = compiled.pack;
    let series_slug = resolve_slug(pack.series.slug.as_deref(), &pack.series.title)?;

    if let Some(existing) = repo.find_series_by_slug(&series_slug).await? {
        if existing.content_hash.as_deref() == Some(compiled.content_hash.as_str()) {
            let episode_count = repo.list_episodes(existing.id).await?.len();
            info!(
                correlation_id = %command.correlation_id,
                series_id = %existing.id,
                "content pack already imported"
            );
            return Ok(ImportOutcome {
                world_id: existing.world_id,
                series: existing,
                episode_count,
                created: false,
            });
        }
        return Err(DomainError::Validation(format!(
            "series {series_slug:?} already exists with different content"
        )));
    }

    let now = clock.now();
    let (world_id, new_world) = match pack.world {
        Some(input) => {
            let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
            match repo.find_world_by_slug(&slug).await? {
                Some(world) => (Some(world.id), None),
                None => {
                    let world = World::create(input, Uuid::now_v7(), now)?;
                    (Some(world.id), Some(world))
                }
            }
        }
        None => (None, None),
    };

    let mut series = Series::create(
        NewSeries {
            world_id,
            title: pack.series.title,
            slug: Some(series_slug),
            tagline: pack.series.tagline,
            series_type: pack.series.series_type,
        },
        Uuid::now_v7(),
        now,
    )?;
    series.content_hash = Some(compiled.content_hash);
    series.is_published = pack.series.publish;

    let templates = pack
        .episodes
        .into_iter()
        .map(|episode| {
            let number = episode.number;
            let mut template = EpisodeTemplate::create(
                NewEpisodeTemplate {
                    series_id: series.id,
                    episode_number: number,
                    title: episode.title,
                    situation: episode.situation,
                    character_id: episode.character_id,
                    beats: episode.beats,
                },
                Uuid::now_v7(),
                now,
            )
            .map_err(|e| match e {
                DomainError::Validation(msg) => {
                    DomainError::Validation(format!("episode {number}: {msg}"))
                }
                other => other,
            })?;
            template.is_published = series.is_published;
            Ok(template)
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    repo.insert_series_with_episodes(new_world.as_ref(), &series, &templates)
        .await?;

    log_handled(command, series.id);
    Ok(ImportOutcome {
        series,
        world_id,
        episode_count: templates.len(),
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use taleweave_core::error::DomainError;
    use taleweave_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::episode::Beat;
    use crate::domain::series::SeriesType;
    use crate::domain::world::NewWorld;
    use crate::in_memory::InMemoryCatalogRepository;

    fn create_series(series_type: &str) -> CreateSeries {
        CreateSeries {
            correlation_id: Uuid::new_v4(),
            input: NewSeries {
                world_id: None,
                title: "Harbor Lights".into(),
                slug: None,
                tagline: None,
                series_type: series_type.into(),
            },
        }
    }

    #[tokio::test]
    async fn test_handle_create_series_persists_valid_series() {
        // Arrange
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();

        // Act
        let series = handle_create_series(&create_series("anthology"), &clock, &repo)
            .await
            .unwrap();

        // Assert
        let stored = repo.find_series(series.id).await.unwrap().unwrap();
        assert_eq!(stored.series_type, SeriesType::Anthology);
        assert_eq!(stored.created_at, clock.0);
    }

    #[tokio::test]
    async fn test_handle_create_series_rejects_unknown_type_without_writing() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();

        let result = handle_create_series(&create_series("saga"), &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo
            .find_series_by_slug("harbor-lights")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_handle_create_series_rejects_duplicate_slug() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        handle_create_series(&create_series("serial"), &clock, &repo)
            .await
            .unwrap();

        let second = handle_create_series(&create_series("serial"), &clock, &repo).await;

        assert!(matches!(second, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_create_series_requires_existing_world() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let mut command = create_series("serial");
        let world_id = Uuid::new_v4();
        command.input.world_id = Some(world_id);

        let result = handle_create_series(&command, &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "world", .. })));
    }

    #[tokio::test]
    async fn test_handle_create_episode_template_requires_series() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let command = CreateEpisodeTemplate {
            correlation_id: Uuid::new_v4(),
            input: NewEpisodeTemplate {
                series_id: Uuid::new_v4(),
                episode_number: 1,
                title: "Pilot".into(),
                situation: String::new(),
                character_id: None,
                beats: vec![Beat {
                    key: "a".into(),
                    title: "A".into(),
                    instructions: "i".into(),
                    target_exchanges: 1,
                    choice: None,
                }],
            },
        };

        let result = handle_create_episode_template(&command, &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_handle_update_world_unknown_id_is_not_found() {
        let repo = InMemoryCatalogRepository::new();
        let command = UpdateWorld {
            correlation_id: Uuid::new_v4(),
            world_id: Uuid::new_v4(),
            update: crate::domain::world::WorldUpdate::default(),
        };

        let result = handle_update_world(&command, &repo).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_handle_delete_image_unknown_id_is_not_found() {
        let repo = InMemoryCatalogRepository::new();

        let result = handle_delete_image(
            &DeleteImage {
                correlation_id: Uuid::new_v4(),
                image_id: Uuid::new_v4(),
            },
            &repo,
        )
        .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    const PACK: &str = "\
world:
  name: Saltmarsh
series:
  title: The Lighthouse
  type: play
  publish: true
episodes:
  - number: 1
    title: Storm Night
    beats:
      - { key: arrival, title: Arrival, instructions: Greet them., target_exchanges: 1 }
  - number: 2
    title: Morning
    script: |
      ## Dawn
      Describe the wreckage.
";

    fn import(document: &str) -> ImportContentPack {
        ImportContentPack {
            correlation_id: Uuid::new_v4(),
            document: document.into(),
        }
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_creates_world_series_and_episodes() {
        // Arrange
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();

        // Act
        let outcome = handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert!(outcome.created);
        assert_eq!(outcome.episode_count, 2);
        assert!(outcome.series.is_published);
        assert_eq!(outcome.series.slug, "the-lighthouse");
        let world = repo.find_world_by_slug("saltmarsh").await.unwrap().unwrap();
        assert_eq!(outcome.world_id, Some(world.id));
        let episodes = repo.list_episodes(outcome.series.id).await.unwrap();
        assert_eq!(episodes[1].beats[0].key, "dawn");
        assert_eq!(repo.list_playable_episodes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_is_idempotent_for_same_document() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let first = handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        let second = handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        assert!(!second.created);
        assert_eq!(second.series.id, first.series.id);
        assert_eq!(second.episode_count, 2);
        assert_eq!(repo.list_worlds(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_rejects_changed_document_for_same_series() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        let changed = PACK.replace("Storm Night", "Calm Night");
        let result = handle_import_content_pack(&import(&changed), &clock, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_reuses_existing_world() {
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let world = handle_create_world(
            &CreateWorld {
                correlation_id: Uuid::new_v4(),
                input: NewWorld {
                    name: "Saltmarsh".into(),
                    ..NewWorld::default()
                },
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();

        let outcome = handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        assert_eq!(outcome.world_id, Some(world.id));
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_invalid_episode_writes_nothing() {
        // Arrange
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let blank_title = PACK.replace("title: Morning", "title: \"   \"");

        // Act
        let failed = handle_import_content_pack(&import(&blank_title), &clock, &repo).await;

        // Assert
        assert!(matches!(failed, Err(DomainError::Validation(msg)) if msg.starts_with("episode 2")));
        assert!(repo.find_series_by_slug("the-lighthouse").await.unwrap().is_none());
        assert!(repo.list_worlds(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_import_content_pack_accepts_corrected_document_after_failure() {
        // Arrange
        let clock = FixedClock::default();
        let repo = InMemoryCatalogRepository::new();
        let numbered_zero = PACK.replace("number: 2", "number: 0");
        let failed = handle_import_content_pack(&import(&numbered_zero), &clock, &repo).await;

        // Act
        let outcome = handle_import_content_pack(&import(PACK), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert!(failed.is_err());
        assert!(outcome.created);
        assert_eq!(repo.list_episodes(outcome.series.id).await.unwrap().len(), 2);
    }
}
