//! Persistence ports for the accounts context.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::profile::{PlatformStats, UserProfile};

/// Storage for member profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts `profile` unless the id exists. Returns whether it was
    /// inserted, so exactly one concurrent first request wins.
    async fn insert_if_absent(&self, profile: &UserProfile) -> Result<bool, DomainError>;
    /// Finds a profile.
    async fn find(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError>;
    /// Records a sighting.
    async fn touch(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<(), DomainError>;
    /// Lists profiles, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, DomainError>;
}

/// Read-only platform counters.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Computes the counters; "active today" means seen at or after
    /// `day_start`.
    async fn platform_stats(&self, day_start: DateTime<Utc>) -> Result<PlatformStats, DomainError>;
}
