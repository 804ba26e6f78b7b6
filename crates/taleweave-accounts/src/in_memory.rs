//! In-memory account storage used by tests and local tooling.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taleweave_core::error::DomainError;
use uuid::Uuid;

use crate::domain::profile::{PlatformStats, UserProfile};
use crate::domain::repository::{StatsRepository, UserRepository};

/// Profiles held in memory. As a `StatsRepository` it only knows about
/// users; every other counter is zero.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<UserProfile>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<UserProfile>>, DomainError> {
        self.rows
            .lock()
            .map_err(|_| DomainError::Infrastructure("user lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_if_absent(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let mut rows = self.rows()?;
        if rows.iter().any(|p| p.id == profile.id) {
            return Ok(false);
        }
        rows.push(profile.clone());
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.rows()?.iter().find(|p| p.id == id).cloned())
    }

    async fn touch(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(row) = self.rows()?.iter_mut().find(|p| p.id == id) {
            row.last_seen_at = seen_at;
        }
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, DomainError> {
        let mut rows = self.rows()?.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }
}

#[async_trait]
impl StatsRepository for InMemoryUserRepository {
    async fn platform_stats(&self, day_start: DateTime<Utc>) -> Result<PlatformStats, DomainError> {
        let rows = self.rows()?;
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(PlatformStats {
            users: count(rows.len()),
            active_users_today: count(rows.iter().filter(|p| p.last_seen_at >= day_start).count()),
            ..PlatformStats::default()
        })
    }
}
