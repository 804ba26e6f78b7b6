//! `PostgreSQL` implementations of `UserRepository` and `StatsRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use taleweave_accounts::domain::profile::{PlatformStats, UserProfile};
use taleweave_accounts::domain::repository::{StatsRepository, UserRepository};
use taleweave_conversation::domain::events::SESSION_STARTED_EVENT_TYPE;
use taleweave_core::error::DomainError;
use taleweave_core::identity::GUEST_USER_ID;
use taleweave_credits::domain::events::{
    CREDITS_DEDUCTED_EVENT_TYPE, CREDITS_GRANTED_EVENT_TYPE, CREDITS_REFUNDED_EVENT_TYPE,
};

use crate::sql::infrastructure;

const COLUMNS: &str = "id, email, display_name, created_at, last_seen_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
            last_seen_at: row.last_seen_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    users: i64,
    active_users_today: i64,
    characters: i64,
    sessions: i64,
    memories: i64,
    credits_granted: i64,
    credits_deducted: i64,
    credits_refunded: i64,
}

/// PostgreSQL-backed member profiles and platform counters. The shared
/// guest row is never listed or counted.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Creates a new `PgUserRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip_all, fields(user_id = %profile.id))]
    async fn insert_if_absent(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, display_name, created_at, last_seen_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(profile.created_at)
        .bind(profile.last_seen_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(row.map(UserProfile::from))
    }

    async fn touch(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET last_seen_at = GREATEST(last_seen_at, $2) WHERE id = $1")
            .bind(id)
            .bind(seen_at)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, DomainError> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE id <> $1
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(GUEST_USER_ID)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}

#[async_trait]
impl StatsRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn platform_stats(&self, day_start: DateTime<Utc>) -> Result<PlatformStats, DomainError> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE id <> $1) AS users,
                (SELECT COUNT(*) FROM users WHERE id <> $1 AND last_seen_at >= $2)
                    AS active_users_today,
                (SELECT COUNT(*) FROM characters) AS characters,
                (SELECT COUNT(*) FROM domain_events WHERE event_type = $3) AS sessions,
                (SELECT COUNT(*) FROM memories) AS memories,
                (SELECT COALESCE(SUM((payload->'CreditsGranted'->>'amount')::BIGINT), 0)::BIGINT
                    FROM domain_events WHERE event_type = $4) AS credits_granted,
                (SELECT COALESCE(SUM((payload->'CreditsDeducted'->>'amount')::BIGINT), 0)::BIGINT
                    FROM domain_events WHERE event_type = $5) AS credits_deducted,
                (SELECT COALESCE(SUM((payload->'CreditsRefunded'->>'amount')::BIGINT), 0)::BIGINT
                    FROM domain_events WHERE event_type = $6) AS credits_refunded",
        )
        .bind(GUEST_USER_ID)
        .bind(day_start)
        .bind(SESSION_STARTED_EVENT_TYPE)
        .bind(CREDITS_GRANTED_EVENT_TYPE)
        .bind(CREDITS_DEDUCTED_EVENT_TYPE)
        .bind(CREDITS_REFUNDED_EVENT_TYPE)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(PlatformStats {
            users: row.users,
            active_users_today: row.active_users_today,
            characters: row.characters,
            sessions: row.sessions,
            memories: row.memories,
            credits_granted: row.credits_granted,
            credits_spent: row.credits_deducted - row.credits_refunded,
        })
    }
}
