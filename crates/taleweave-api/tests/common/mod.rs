//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use taleweave_accounts::domain::admin::AdminAllowList;
use taleweave_accounts::in_memory::InMemoryUserRepository;
use taleweave_api::auth::{Claims, SESSION_ID_HEADER, issue_token};
use taleweave_api::state::{AppSettings, AppState};
use taleweave_api::{build_router, cors_layer};
use taleweave_catalog::in_memory::InMemoryCatalogRepository;
use taleweave_characters::domain::repository::CharacterRepository;
use taleweave_characters::in_memory::InMemoryCharacterRepository;
use taleweave_core::generation::TextGenerator;
use taleweave_core::repository::EventRepository;
use taleweave_memory::in_memory::InMemoryMemoryRepository;
use taleweave_store::pg_catalog_repository::PgCatalogRepository;
use taleweave_store::pg_character_repository::PgCharacterRepository;
use taleweave_store::pg_event_repository::PgEventRepository;
use taleweave_store::pg_memory_repository::PgMemoryRepository;
use taleweave_store::pg_user_repository::PgUserRepository;
use taleweave_test_support::{FixedClock, InMemoryEventRepository, ScriptedGenerator, StubEmbedder};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@taleweave.test";
pub const SIGNUP_GRANT: i64 = 50;

/// Ignition reply the default generator answers first.
pub const IGNITION_REPLY: &str = r#"{"opening_situation": "A lamp-lit harbour office.", "opening_line": "You're late, sailor.", "starter_prompts": ["Who are you?"]}"#;

/// Reply the default generator gives to every chat turn.
pub const CHAT_REPLY: &str = "Aye, sit down and listen.";

/// Who a request is sent as.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    Token(String),
    Guest(String),
}

impl Caller {
    pub fn member(user_id: Uuid, email: &str) -> Self {
        let claims = Claims {
            sub: user_id,
            email: email.into(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        Self::Token(issue_token(&claims, JWT_SECRET).unwrap())
    }

    pub fn new_member() -> Self {
        let user_id = Uuid::new_v4();
        Self::member(user_id, &format!("{user_id}@taleweave.test"))
    }

    pub fn admin() -> Self {
        Self::member(Uuid::new_v4(), ADMIN_EMAIL)
    }

    pub fn guest(session_id: &str) -> Self {
        Self::Guest(session_id.into())
    }
}

/// The router plus a handle on the character store behind it, for seeding.
pub struct TestApp {
    pub router: Router,
    pub characters: Arc<dyn CharacterRepository>,
}

pub fn scripted_generator() -> Arc<ScriptedGenerator> {
    Arc::new(ScriptedGenerator::scripted([IGNITION_REPLY], CHAT_REPLY))
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(scripted_generator())
}

fn test_settings() -> Arc<AppSettings> {
    Arc::new(AppSettings {
        jwt_secret: JWT_SECRET.into(),
        admins: AdminAllowList::parse(ADMIN_EMAIL),
        asset_base_url: "https://cdn.taleweave.test/assets".into(),
        signup_grant: SIGNUP_GRANT,
    })
}

/// Builds the app over PostgreSQL repositories with the scripted generator.
pub fn build_pg_app(pool: PgPool) -> TestApp {
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let characters = Arc::new(PgCharacterRepository::new(pool.clone()));
    let state = AppState {
        clock: Arc::new(taleweave_core::clock::SystemClock),
        events: Arc::new(PgEventRepository::new(pool.clone())),
        catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
        characters: characters.clone(),
        memories: Arc::new(PgMemoryRepository::new(pool)),
        users: users.clone(),
        stats: users,
        generator: Arc::new(ScriptedGenerator::scripted([IGNITION_REPLY], CHAT_REPLY)),
        embedder: Arc::new(StubEmbedder),
        settings: test_settings(),
    };
    TestApp {
        router: build_router(state, cors_layer(None).unwrap()),
        characters,
    }
}

pub fn build_test_app_with(generator: Arc<dyn TextGenerator>) -> TestApp {
    build_test_app_over(
        generator,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryEventRepository::new()),
    )
}

/// Builds the in-memory app over the given user and event stores, so tests
/// can share them between apps or swap in a failing event store.
pub fn build_test_app_over(
    generator: Arc<dyn TextGenerator>,
    users: Arc<InMemoryUserRepository>,
    events: Arc<dyn EventRepository>,
) -> TestApp {
    let characters = Arc::new(InMemoryCharacterRepository::new());
    let state = AppState {
        clock: Arc::new(FixedClock(
            chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 3, 14, 9, 30, 0).unwrap(),
        )),
        events,
        catalog: Arc::new(InMemoryCatalogRepository::new()),
        characters: characters.clone(),
        memories: Arc::new(InMemoryMemoryRepository::new()),
        users: users.clone(),
        stats: users,
        generator,
        embedder: Arc::new(StubEmbedder),
        settings: test_settings(),
    };
    TestApp {
        router: build_router(state, cors_layer(None).unwrap()),
        characters,
    }
}

impl TestApp {
    /// Sends a request and returns the status and JSON body (`Null` when the
    /// body is empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        caller: &Caller,
        body: Option<Body>,
        content_type: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match caller {
            Caller::Anonymous => builder,
            Caller::Token(token) => builder.header("authorization", format!("Bearer {token}")),
            Caller::Guest(session_id) => builder.header(SESSION_ID_HEADER, session_id.as_str()),
        };
        let request = match body {
            Some(body) => builder.header("content-type", content_type).body(body),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, caller: &Caller) -> (StatusCode, Value) {
        self.send("GET", uri, caller, None, "").await
    }

    pub async fn delete(&self, uri: &str, caller: &Caller) -> (StatusCode, Value) {
        self.send("DELETE", uri, caller, None, "").await
    }

    pub async fn post(&self, uri: &str, caller: &Caller, body: &Value) -> (StatusCode, Value) {
        let body = Body::from(serde_json::to_vec(body).unwrap());
        self.send("POST", uri, caller, Some(body), "application/json")
            .await
    }

    pub async fn patch(&self, uri: &str, caller: &Caller, body: &Value) -> (StatusCode, Value) {
        let body = Body::from(serde_json::to_vec(body).unwrap());
        self.send("PATCH", uri, caller, Some(body), "application/json")
            .await
    }

    pub async fn post_text(&self, uri: &str, caller: &Caller, text: &str) -> (StatusCode, Value) {
        self.send("POST", uri, caller, Some(Body::from(text.to_owned())), "text/plain")
            .await
    }

    /// Creates a public character as `caller` and returns its id.
    pub async fn create_character(&self, caller: &Caller, name: &str) -> Uuid {
        let (status, json) = self
            .post(
                "/api/v1/characters",
                caller,
                &json!({
                    "name": name,
                    "personality": "Gruff but kind",
                    "is_public": true
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["id"].as_str().unwrap().parse().unwrap()
    }

    /// Creates a published episode template in a new published series and
    /// returns the template id.
    pub async fn publish_episode(&self, series_type: &str, beats: Value) -> Uuid {
        let admin = Caller::admin();
        let (status, series) = self
            .post(
                "/api/v1/series",
                &admin,
                &json!({ "title": format!("Series {}", Uuid::new_v4()), "series_type": series_type }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{series}");
        let series_id = series["id"].as_str().unwrap().to_owned();
        let (status, _) = self
            .post(&format!("/api/v1/series/{series_id}/publish"), &admin, &json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, episode) = self
            .post(
                "/api/v1/episode-templates",
                &admin,
                &json!({
                    "series_id": series_id,
                    "episode_number": 1,
                    "title": "Storm Night",
                    "situation": "Rain hammers the harbour.",
                    "beats": beats
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{episode}");
        let episode_id = episode["id"].as_str().unwrap().to_owned();
        let (status, _) = self
            .post(
                &format!("/api/v1/episode-templates/{episode_id}/publish"),
                &admin,
                &json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        episode_id.parse().unwrap()
    }

    /// Grants `amount` credits to the member behind `user_id` as an admin.
    pub async fn grant(&self, user_id: Uuid, amount: i64) {
        let (status, json) = self
            .post(
                "/api/v1/credits/grant",
                &Caller::admin(),
                &json!({ "user_id": user_id, "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
    }
}

/// A single long beat with no choice.
pub fn long_beat() -> Value {
    json!([{ "key": "talk", "title": "Talk", "instructions": "Chat.", "target_exchanges": 50 }])
}
