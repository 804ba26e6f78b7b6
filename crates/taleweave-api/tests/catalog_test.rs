//! Integration tests for worlds, series, episode templates, games, images
//! and search.

mod common;

use axum::http::StatusCode;
use common::Caller;
use serde_json::json;

#[tokio::test]
async fn test_world_creation_is_admin_only() {
    let app = common::build_test_app();

    let (status, _) = app
        .post("/api/v1/worlds", &Caller::new_member(), &json!({ "name": "Saltmarsh" }))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_world_round_trip_by_id_and_slug() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();

    // Act
    let (status, created) = app
        .post(
            "/api/v1/worlds",
            &admin,
            &json!({ "name": "Salt Marsh Harbour", "tone": "melancholy" }),
        )
        .await;
    let world_id = created["id"].as_str().unwrap().to_owned();
    let (by_id_status, by_id) = app
        .get(&format!("/api/v1/worlds/{world_id}"), &Caller::Anonymous)
        .await;
    let (by_slug_status, by_slug) = app
        .get("/api/v1/worlds/slug/salt-marsh-harbour", &Caller::Anonymous)
        .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "salt-marsh-harbour");
    assert_eq!(by_id_status, StatusCode::OK);
    assert_eq!(by_id["name"], "Salt Marsh Harbour");
    assert_eq!(by_slug_status, StatusCode::OK);
    assert_eq!(by_slug["id"], created["id"]);
}

#[tokio::test]
async fn test_duplicate_world_slug_is_rejected() {
    let app = common::build_test_app();
    let admin = Caller::admin();
    app.post("/api/v1/worlds", &admin, &json!({ "name": "Eldmoor" }))
        .await;

    let (status, json) = app
        .post("/api/v1/worlds", &admin, &json!({ "name": "Eldmoor" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_unpublished_series_are_hidden_from_players() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();
    let (_, series) = app
        .post(
            "/api/v1/series",
            &admin,
            &json!({ "title": "The Lighthouse", "series_type": "serial" }),
        )
        .await;
    let series_id = series["id"].as_str().unwrap().to_owned();

    // Act
    let (player_status, _) = app
        .get(&format!("/api/v1/series/{series_id}"), &Caller::Anonymous)
        .await;
    let (_, player_list) = app
        .get("/api/v1/series?include_unpublished=true", &Caller::new_member())
        .await;
    let (_, admin_list) = app
        .get("/api/v1/series?include_unpublished=true", &admin)
        .await;

    // Assert
    assert_eq!(player_status, StatusCode::NOT_FOUND);
    assert!(player_list.as_array().unwrap().is_empty());
    assert_eq!(admin_list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_series_type_outside_the_fixed_set_is_rejected() {
    let app = common::build_test_app();

    let (status, _) = app
        .post(
            "/api/v1/series",
            &Caller::admin(),
            &json!({ "title": "Odd", "series_type": "sitcom" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_series_list_filters_by_type() {
    // Arrange
    let app = common::build_test_app();
    app.publish_episode("play", common::long_beat()).await;
    app.publish_episode("anthology", common::long_beat()).await;

    // Act
    let (status, json) = app
        .get("/api/v1/series?series_type=play", &Caller::Anonymous)
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let series = json.as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["series_type"], "play");
}

#[tokio::test]
async fn test_games_lists_published_play_episodes_only() {
    // Arrange
    let app = common::build_test_app();
    let game = app.publish_episode("play", common::long_beat()).await;
    app.publish_episode("serial", common::long_beat()).await;

    // Act
    let (status, json) = app.get("/api/v1/games", &Caller::Anonymous).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let games = json.as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["id"], game.to_string());
}

#[tokio::test]
async fn test_episode_template_without_beats_is_rejected() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();
    let (_, series) = app
        .post(
            "/api/v1/series",
            &admin,
            &json!({ "title": "Empty", "series_type": "standalone" }),
        )
        .await;

    // Act
    let (status, _) = app
        .post(
            "/api/v1/episode-templates",
            &admin,
            &json!({
                "series_id": series["id"],
                "episode_number": 1,
                "title": "Nothing happens",
                "beats": []
            }),
        )
        .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_register_list_and_delete() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();
    let (_, world) = app
        .post("/api/v1/worlds", &admin, &json!({ "name": "Glasswater" }))
        .await;
    let world_id = world["id"].as_str().unwrap().to_owned();

    // Act
    let (status, image) = app
        .post(
            "/api/v1/images",
            &admin,
            &json!({
                "owner_kind": "world",
                "owner_id": world_id,
                "purpose": "cover",
                "storage_key": "worlds/glasswater/cover.png",
                "mime_type": "image/png"
            }),
        )
        .await;
    let image_id = image["id"].as_str().unwrap().to_owned();
    let (_, listed) = app
        .get(
            &format!("/api/v1/images?owner_kind=world&owner_id={world_id}"),
            &Caller::Anonymous,
        )
        .await;
    let (delete_status, _) = app
        .delete(&format!("/api/v1/images/{image_id}"), &admin)
        .await;
    let (after_status, _) = app
        .get(&format!("/api/v1/images/{image_id}"), &Caller::Anonymous)
        .await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        image["url"],
        "https://cdn.taleweave.test/assets/worlds/glasswater/cover.png"
    );
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(delete_status, StatusCode::NO_CONTENT);
    assert_eq!(after_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_rejects_short_queries() {
    let app = common::build_test_app();

    let (status, json) = app.get("/api/v1/search?q=%20a%20", &Caller::Anonymous).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_search_matches_worlds_and_public_characters() {
    // Arrange
    let app = common::build_test_app();
    app.post(
        "/api/v1/worlds",
        &Caller::admin(),
        &json!({ "name": "Harbour of Mist" }),
    )
    .await;
    app.create_character(&Caller::new_member(), "Harbourmaster Quill")
        .await;

    // Act
    let (status, json) = app.get("/api/v1/search?q=HARBOUR", &Caller::Anonymous).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["worlds"].as_array().unwrap().len(), 1);
    assert!(json["series"].as_array().unwrap().is_empty());
    assert_eq!(json["characters"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deactivated_world_is_visible_to_admins_only() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();
    let (_, world) = app
        .post("/api/v1/worlds", &admin, &json!({ "name": "Sunken Reach" }))
        .await;
    let uri = format!("/api/v1/worlds/{}", world["id"].as_str().unwrap());

    // Act
    let (patch_status, patched) = app.patch(&uri, &admin, &json!({ "is_active": false })).await;
    let (player_status, _) = app.get(&uri, &Caller::Anonymous).await;
    let (admin_status, _) = app.get(&uri, &admin).await;
    let (_, listed) = app.get("/api/v1/worlds", &Caller::Anonymous).await;

    // Assert
    assert_eq!(patch_status, StatusCode::OK);
    assert_eq!(patched["is_active"], false);
    assert_eq!(player_status, StatusCode::NOT_FOUND);
    assert_eq!(admin_status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}
