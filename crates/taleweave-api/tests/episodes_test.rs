//! Integration tests for episode sessions, message billing and guest caps.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{CHAT_REPLY, Caller, SIGNUP_GRANT, TestApp};
use serde_json::{Value, json};
use taleweave_characters::domain::character::{Character, NewCharacter};
use taleweave_test_support::{FailingGenerator, fixed_now};
use uuid::Uuid;

async fn start(app: &TestApp, caller: &Caller, template_id: Uuid, character_id: Uuid) -> Value {
    let (status, json) = app
        .post(
            "/api/v1/episodes",
            caller,
            &json!({ "episode_template_id": template_id, "character_id": character_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json
}

async fn say(app: &TestApp, caller: &Caller, session_id: &str, content: &str) -> (StatusCode, Value) {
    app.post(
        &format!("/api/v1/episodes/{session_id}/messages"),
        caller,
        &json!({ "content": content }),
    )
    .await
}

async fn signed_up_member(app: &TestApp) -> (Uuid, Caller) {
    let user_id = Uuid::new_v4();
    let member = Caller::member(user_id, &format!("{user_id}@taleweave.test"));
    let (status, _) = app.get("/api/v1/users/me", &member).await;
    assert_eq!(status, StatusCode::OK);
    (user_id, member)
}

#[tokio::test]
async fn test_member_message_is_answered_and_billed() {
    // Arrange
    let app = common::build_test_app();
    let (_, member) = signed_up_member(&app).await;
    let character_id = app.create_character(&member, "Captain Mira").await;
    let template_id = app.publish_episode("serial", common::long_beat()).await;
    let session = start(&app, &member, template_id, character_id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Act
    let (status, json) = say(&app, &member, &session_id, "Where is the ship?").await;
    let (_, balance) = app.get("/api/v1/credits", &member).await;
    let (_, transcript) = app
        .get(&format!("/api/v1/episodes/{session_id}/messages"), &member)
        .await;

    // Assert
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["reply"], CHAT_REPLY);
    assert_eq!(json["session"]["message_count"], 1);
    assert!(json["session"]["guest_messages_remaining"].is_null());
    assert_eq!(balance["balance"], SIGNUP_GRANT - 1);
    assert_eq!(balance["total_spent"], 1);
    let entries = transcript.as_array().unwrap();
    assert_eq!(entries.first().unwrap()["content"], "You're late, sailor.");
    assert_eq!(entries.last().unwrap()["content"], CHAT_REPLY);
}

#[tokio::test]
async fn test_member_without_credits_gets_402_and_nothing_is_recorded() {
    // Arrange
    let app = common::build_test_app();
    let member = Caller::new_member();
    let character_id = app.create_character(&member, "Broke Bill").await;
    let template_id = app.publish_episode("serial", common::long_beat()).await;
    let session = start(&app, &member, template_id, character_id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Act
    let (status, json) = say(&app, &member, &session_id, "Hello?").await;
    let (_, view) = app
        .get(&format!("/api/v1/episodes/{session_id}"), &member)
        .await;

    // Assert
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["error"], "insufficient_credits");
    assert_eq!(view["message_count"], 0);
}

#[tokio::test]
async fn test_failed_generation_refunds_the_message() {
    // Arrange
    let app = common::build_test_app_with(Arc::new(FailingGenerator));
    let (user_id, member) = signed_up_member(&app).await;
    let character = Character::create(
        NewCharacter {
            name: "Silent Sue".into(),
            personality: "Quiet".into(),
            is_public: true,
            ..NewCharacter::default()
        },
        Uuid::new_v4(),
        user_id,
        fixed_now(),
    )
    .unwrap();
    app.characters.insert(&character).await.unwrap();
    let template_id = app.publish_episode("serial", common::long_beat()).await;
    let session = start(&app, &member, template_id, character.id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Act
    let (status, json) = say(&app, &member, &session_id, "Anyone there?").await;
    let (_, balance) = app.get("/api/v1/credits", &member).await;

    // Assert
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "upstream_error");
    assert_eq!(balance["balance"], SIGNUP_GRANT);
    assert_eq!(balance["total_spent"], 0);
}

#[tokio::test]
async fn test_guest_is_capped_at_ten_messages() {
    // Arrange
    let app = common::build_test_app();
    let character_id = app.create_character(&Caller::new_member(), "Chatty Cal").await;
    let template_id = app.publish_episode("serial", common::long_beat()).await;
    let guest = Caller::guest("browser-tab-42");
    let session = start(&app, &guest, template_id, character_id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();
    assert_eq!(session["guest_messages_remaining"], 10);

    // Act
    for n in 0..10 {
        let (status, _) = say(&app, &guest, &session_id, &format!("message {n}")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, json) = say(&app, &guest, &session_id, "one more?").await;

    // Assert
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "limit_exceeded");
}

#[tokio::test]
async fn test_guest_sessions_are_private_to_their_session_id() {
    // Arrange
    let app = common::build_test_app();
    let character_id = app.create_character(&Caller::new_member(), "Guarded Gus").await;
    let template_id = app.publish_episode("serial", common::long_beat()).await;
    let session = start(&app, &Caller::guest("tab-a"), template_id, character_id).await;
    let uri = format!("/api/v1/episodes/{}", session["id"].as_str().unwrap());

    // Act
    let (own, _) = app.get(&uri, &Caller::guest("tab-a")).await;
    let (other_guest, _) = app.get(&uri, &Caller::guest("tab-b")).await;
    let (member, _) = app.get(&uri, &Caller::new_member()).await;

    // Assert
    assert_eq!(own, StatusCode::OK);
    assert_eq!(other_guest, StatusCode::NOT_FOUND);
    assert_eq!(member, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_choice_point_blocks_advance_until_resolved() {
    // Arrange
    let app = common::build_test_app();
    let character_id = app.create_character(&Caller::new_member(), "Gatekeeper").await;
    let beats = json!([
        {
            "key": "door",
            "title": "The Door",
            "instructions": "Ask whether to open the door.",
            "target_exchanges": 1,
            "choice": {
                "prompt": "Open the door?",
                "options": [
                    { "key": "open", "label": "Open it", "consequence": "The storm rushes in." },
                    { "key": "wait", "label": "Wait" }
                ]
            }
        },
        { "key": "inside", "title": "Inside", "instructions": "Warm up by the fire." }
    ]);
    let template_id = app.publish_episode("play", beats).await;
    let guest = Caller::guest("tab-choice");
    let session = start(&app, &guest, template_id, character_id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Act
    let (advance_status, _) = app
        .post(&format!("/api/v1/episodes/{session_id}/advance"), &guest, &json!({}))
        .await;
    let (bad_choice, _) = app
        .post(
            &format!("/api/v1/episodes/{session_id}/choice"),
            &guest,
            &json!({ "option_key": "climb" }),
        )
        .await;
    let (choice_status, view) = app
        .post(
            &format!("/api/v1/episodes/{session_id}/choice"),
            &guest,
            &json!({ "option_key": "open" }),
        )
        .await;

    // Assert
    assert_eq!(advance_status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_choice, StatusCode::BAD_REQUEST);
    assert_eq!(choice_status, StatusCode::OK);
    assert_eq!(view["current_beat"]["key"], "inside");
    assert_eq!(view["choices"][0]["option_key"], "open");
    assert_eq!(view["choices"][0]["consequence"], "The storm rushes in.");
}

#[tokio::test]
async fn test_completed_episode_rejects_messages_without_billing() {
    // Arrange
    let app = common::build_test_app();
    let (_, member) = signed_up_member(&app).await;
    let character_id = app.create_character(&member, "Brief Bea").await;
    let beats = json!([{ "key": "only", "title": "Only", "instructions": "Say goodbye.", "target_exchanges": 1 }]);
    let template_id = app.publish_episode("standalone", beats).await;
    let session = start(&app, &member, template_id, character_id).await;
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Act
    let (first, reply) = say(&app, &member, &session_id, "Goodbye.").await;
    let (second, _) = say(&app, &member, &session_id, "Wait!").await;
    let (_, balance) = app.get("/api/v1/credits", &member).await;

    // Assert
    assert_eq!(first, StatusCode::OK);
    assert_eq!(reply["session"]["completed"], true);
    assert!(reply["session"]["current_beat"].is_null());
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(balance["balance"], SIGNUP_GRANT - 1);
}

#[tokio::test]
async fn test_unpublished_template_cannot_be_started() {
    // Arrange
    let app = common::build_test_app();
    let admin = Caller::admin();
    let character_id = app.create_character(&admin, "Draft Dan").await;
    let (_, series) = app
        .post(
            "/api/v1/series",
            &admin,
            &json!({ "title": "Drafts", "series_type": "serial" }),
        )
        .await;
    let (_, template) = app
        .post(
            "/api/v1/episode-templates",
            &admin,
            &json!({
                "series_id": series["id"],
                "episode_number": 1,
                "title": "Work in progress",
                "beats": common::long_beat()
            }),
        )
        .await;

    // Act
    let (status, _) = app
        .post(
            "/api/v1/episodes",
            &Caller::new_member(),
            &json!({ "episode_template_id": template["id"], "character_id": character_id }),
        )
        .await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
}
