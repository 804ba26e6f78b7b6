//! End-to-end tests against PostgreSQL repositories.

mod common;

use axum::http::StatusCode;
use common::{CHAT_REPLY, Caller, SIGNUP_GRANT};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../migrations")]
async fn test_member_plays_an_episode_end_to_end(pool: PgPool) {
    // Arrange
    let app = common::build_pg_app(pool);
    let user_id = Uuid::new_v4();
    let member = Caller::member(user_id, "pg-player@taleweave.test");
    let (status, _) = app.get("/api/v1/users/me", &member).await;
    assert_eq!(status, StatusCode::OK);
    let character_id = app.create_character(&member, "Harbour Hal").await;
    let template_id = app.publish_episode("serial", common::long_beat()).await;

    // Act
    let (start_status, session) = app
        .post(
            "/api/v1/episodes",
            &member,
            &json!({ "episode_template_id": template_id, "character_id": character_id }),
        )
        .await;
    let session_id = session["id"].as_str().unwrap().to_owned();
    let (say_status, reply) = app
        .post(
            &format!("/api/v1/episodes/{session_id}/messages"),
            &member,
            &json!({ "content": "Which way to the lighthouse?" }),
        )
        .await;
    let (_, balance) = app.get("/api/v1/credits", &member).await;
    let (_, stats) = app.get("/api/v1/admin/stats", &Caller::admin()).await;

    // Assert
    assert_eq!(start_status, StatusCode::CREATED);
    assert_eq!(say_status, StatusCode::OK, "{reply}");
    assert_eq!(reply["reply"], CHAT_REPLY);
    assert_eq!(balance["balance"], SIGNUP_GRANT - 1);
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["sessions"], 1);
    assert_eq!(stats["credits_granted"], SIGNUP_GRANT);
    assert_eq!(stats["credits_spent"], 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_world_slug_maps_to_400(pool: PgPool) {
    let app = common::build_pg_app(pool);
    let admin = Caller::admin();
    app.post("/api/v1/worlds", &admin, &json!({ "name": "Fenwick" }))
        .await;

    let (status, json) = app
        .post("/api/v1/worlds", &admin, &json!({ "name": "Fenwick" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}
