//! Integration tests for `PgCatalogRepository`.

use sqlx::PgPool;
use taleweave_catalog::domain::episode::{Beat, ChoiceOption, ChoicePoint, EpisodeTemplate};
use taleweave_catalog::domain::image::{Image, ImageOwnerKind, ImagePurpose};
use taleweave_catalog::domain::repository::CatalogRepository;
use taleweave_catalog::domain::series::{Series, SeriesFilter, SeriesType};
use taleweave_catalog::domain::world::{NewWorld, World};
use taleweave_core::error::DomainError;
use taleweave_store::pg_catalog_repository::PgCatalogRepository;
use taleweave_test_support::fixed_now;
use uuid::Uuid;

fn world(name: &str) -> World {
    World::create(
        NewWorld {
            name: name.to_owned(),
            default_scenes: vec!["harbour".to_owned()],
            ambient_details: Some(serde_json::json!({ "weather": "fog" })),
            ..NewWorld::default()
        },
        Uuid::new_v4(),
        fixed_now(),
    )
    .unwrap()
}

fn series(title: &str, series_type: SeriesType, published: bool) -> Series {
    Series {
        id: Uuid::new_v4(),
        world_id: None,
        title: title.to_owned(),
        slug: title.to_lowercase().replace(' ', "-"),
        tagline: None,
        series_type,
        is_published: published,
        content_hash: None,
        created_at: fixed_now(),
    }
}

fn episode(series_id: Uuid, number: i32, published: bool) -> EpisodeTemplate {
    EpisodeTemplate {
        id: Uuid::new_v4(),
        series_id,
        episode_number: number,
        title: format!("Episode {number}"),
        situation: "A storm rolls in.".to_owned(),
        character_id: None,
        beats: vec![Beat {
            key: "arrival".to_owned(),
            title: "Arrival".to_owned(),
            instructions: "Greet the visitor.".to_owned(),
            target_exchanges: 2,
            choice: Some(ChoicePoint {
                prompt: "Which way?".to_owned(),
                options: vec![
                    ChoiceOption {
                        key: "stairs".to_owned(),
                        label: "Climb the stairs".to_owned(),
                        consequence: String::new(),
                    },
                    ChoiceOption {
                        key: "cellar".to_owned(),
                        label: "Descend".to_owned(),
                        consequence: "It is dark.".to_owned(),
                    },
                ],
            }),
        }],
        is_published: published,
        created_at: fixed_now(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_world_round_trip_and_duplicate_slug(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let saltmarsh = world("Saltmarsh");
    repo.insert_world(&saltmarsh).await.unwrap();

    // Act
    let by_slug = repo.find_world_by_slug("saltmarsh").await.unwrap();
    let mut twin = world("Saltmarsh");
    twin.id = Uuid::new_v4();
    let duplicate = repo.insert_world(&twin).await;

    // Assert
    assert_eq!(by_slug, Some(saltmarsh));
    assert!(matches!(duplicate, Err(DomainError::Validation(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_inactive_worlds_are_hidden_unless_requested(pool: PgPool) {
    let repo = PgCatalogRepository::new(pool);
    let mut ghost = world("Ghost Coast");
    ghost.is_active = false;
    repo.insert_world(&world("Amber Vale")).await.unwrap();
    repo.insert_world(&ghost).await.unwrap();

    assert_eq!(repo.list_worlds(false).await.unwrap().len(), 1);
    assert_eq!(repo.list_worlds(true).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_database_rejects_unknown_series_type(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO series (id, title, slug, series_type) VALUES ($1, 'Odd', 'odd', 'saga')",
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await;

    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_series_applies_filter(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    repo.insert_series(&series("Lighthouse", SeriesType::Play, true))
        .await
        .unwrap();
    repo.insert_series(&series("Tides", SeriesType::Serial, true))
        .await
        .unwrap();
    repo.insert_series(&series("Drafts", SeriesType::Play, false))
        .await
        .unwrap();

    // Act
    let plays = repo
        .list_series(&SeriesFilter {
            series_type: Some(SeriesType::Play),
            ..SeriesFilter::default()
        })
        .await
        .unwrap();
    let everything = repo
        .list_series(&SeriesFilter {
            include_unpublished: true,
            ..SeriesFilter::default()
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(plays.len(), 1);
    assert_eq!(plays[0].title, "Lighthouse");
    assert_eq!(everything.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_episode_numbers_are_unique_per_series(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let lighthouse = series("Lighthouse", SeriesType::Play, true);
    repo.insert_series(&lighthouse).await.unwrap();
    let first = episode(lighthouse.id, 1, true);
    repo.insert_episode(&first).await.unwrap();

    // Act
    let duplicate = repo.insert_episode(&episode(lighthouse.id, 1, false)).await;
    let loaded = repo.find_episode(first.id).await.unwrap();

    // Assert
    assert!(matches!(duplicate, Err(DomainError::Validation(_))));
    assert_eq!(loaded, Some(first));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_series_with_episodes_is_stored_together(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let saltmarsh = world("Saltmarsh");
    let mut lighthouse = series("Lighthouse", SeriesType::Play, true);
    lighthouse.world_id = Some(saltmarsh.id);
    let episodes = vec![episode(lighthouse.id, 1, true), episode(lighthouse.id, 2, true)];

    // Act
    repo.insert_series_with_episodes(Some(&saltmarsh), &lighthouse, &episodes)
        .await
        .unwrap();

    // Assert
    assert!(repo.find_world(saltmarsh.id).await.unwrap().is_some());
    assert_eq!(repo.find_series(lighthouse.id).await.unwrap(), Some(lighthouse.clone()));
    assert_eq!(repo.list_episodes(lighthouse.id).await.unwrap(), episodes);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_series_with_episodes_rolls_back_on_conflict(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let saltmarsh = world("Saltmarsh");
    let mut lighthouse = series("Lighthouse", SeriesType::Play, true);
    lighthouse.world_id = Some(saltmarsh.id);
    let episodes = vec![episode(lighthouse.id, 1, true), episode(lighthouse.id, 1, true)];

    // Act
    let result = repo
        .insert_series_with_episodes(Some(&saltmarsh), &lighthouse, &episodes)
        .await;

    // Assert
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(repo.find_world(saltmarsh.id).await.unwrap().is_none());
    assert!(repo.find_series_by_slug("lighthouse").await.unwrap().is_none());
    assert!(repo.list_episodes(lighthouse.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_playable_episodes_need_published_play_series(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let play = series("Lighthouse", SeriesType::Play, true);
    let serial = series("Tides", SeriesType::Serial, true);
    repo.insert_series(&play).await.unwrap();
    repo.insert_series(&serial).await.unwrap();
    let playable = episode(play.id, 1, true);
    repo.insert_episode(&playable).await.unwrap();
    repo.insert_episode(&episode(play.id, 2, false)).await.unwrap();
    repo.insert_episode(&episode(serial.id, 1, true)).await.unwrap();

    // Act
    let games = repo.list_playable_episodes().await.unwrap();

    // Assert
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, playable.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_images_list_by_owner_and_delete(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    let owner_id = Uuid::new_v4();
    let image = Image {
        id: Uuid::new_v4(),
        owner_kind: ImageOwnerKind::Character,
        owner_id,
        purpose: ImagePurpose::Avatar,
        storage_key: "characters/captain.png".to_owned(),
        mime_type: "image/png".to_owned(),
        width: Some(512),
        height: Some(512),
        prompt: None,
        created_at: fixed_now(),
    };
    repo.insert_image(&image).await.unwrap();

    // Act
    let listed = repo
        .list_images(ImageOwnerKind::Character, owner_id)
        .await
        .unwrap();
    let removed = repo.delete_image(image.id).await.unwrap();
    let removed_again = repo.delete_image(image.id).await.unwrap();

    // Assert
    assert_eq!(listed, vec![image]);
    assert!(removed);
    assert!(!removed_again);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_search_is_case_insensitive_and_literal(pool: PgPool) {
    // Arrange
    let repo = PgCatalogRepository::new(pool);
    repo.insert_world(&world("Saltmarsh")).await.unwrap();
    repo.insert_series(&series("Salt and Sorrow", SeriesType::Serial, true))
        .await
        .unwrap();
    repo.insert_series(&series("Salt Drafts", SeriesType::Serial, false))
        .await
        .unwrap();

    // Act
    let matches = repo.search("SALT", 20).await.unwrap();
    let wildcard = repo.search("%", 20).await.unwrap();

    // Assert
    assert_eq!(matches.worlds.len(), 1);
    assert_eq!(matches.series.len(), 1);
    assert!(wildcard.worlds.is_empty());
    assert!(wildcard.series.is_empty());
}
