//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;
use taleweave_accounts::domain::admin::AdminAllowList;
use taleweave_accounts::domain::repository::{StatsRepository, UserRepository};
use taleweave_catalog::domain::repository::CatalogRepository;
use taleweave_characters::domain::repository::CharacterRepository;
use taleweave_core::clock::{Clock, SystemClock};
use taleweave_core::generation::{Embedder, TextGenerator};
use taleweave_core::repository::EventRepository;
use taleweave_llm::LlmClient;
use taleweave_memory::domain::repository::MemoryRepository;
use taleweave_store::pg_catalog_repository::PgCatalogRepository;
use taleweave_store::pg_character_repository::PgCharacterRepository;
use taleweave_store::pg_event_repository::PgEventRepository;
use taleweave_store::pg_memory_repository::PgMemoryRepository;
use taleweave_store::pg_user_repository::PgUserRepository;

/// Request-independent settings handlers need.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// HS256 secret member tokens are signed with.
    pub jwt_secret: String,
    /// Members allowed to use admin routes.
    pub admins: AdminAllowList,
    /// Prefix for public image URLs.
    pub asset_base_url: String,
    /// Credits granted to a new member.
    pub signup_grant: i64,
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Event store for sessions and credit accounts.
    pub events: Arc<dyn EventRepository>,
    /// Worlds, series, episode templates and images.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Characters.
    pub characters: Arc<dyn CharacterRepository>,
    /// Memories.
    pub memories: Arc<dyn MemoryRepository>,
    /// Member profiles.
    pub users: Arc<dyn UserRepository>,
    /// Platform counters.
    pub stats: Arc<dyn StatsRepository>,
    /// Chat completions.
    pub generator: Arc<dyn TextGenerator>,
    /// Embeddings.
    pub embedder: Arc<dyn Embedder>,
    /// Static settings.
    pub settings: Arc<AppSettings>,
}

impl AppState {
    /// State backed by PostgreSQL and the given provider client.
    #[must_use]
    pub fn postgres(pool: PgPool, llm: Arc<LlmClient>, settings: AppSettings) -> Self {
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        Self {
            clock: Arc::new(SystemClock),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            characters: Arc::new(PgCharacterRepository::new(pool.clone())),
            memories: Arc::new(PgMemoryRepository::new(pool)),
            users: users.clone(),
            stats: users,
            generator: llm.clone(),
            embedder: llm,
            settings: Arc::new(settings),
        }
    }
}
