//! Query handlers for the accounts context.

use taleweave_core::clock::Clock;
use taleweave_core::error::DomainError;

use crate::domain::profile::{PlatformStats, UserProfile};
use crate::domain::repository::{StatsRepository, UserRepository};

/// Users returned per page when the caller does not say.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest accepted page.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Computes the admin dashboard counters.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_platform_stats(
    clock: &dyn Clock,
    stats: &dyn StatsRepository,
) -> Result<PlatformStats, DomainError> {
    stats.platform_stats(clock.start_of_today()).await
}

/// Lists member profiles, newest first.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a negative offset.
pub async fn list_users(
    limit: Option<i64>,
    offset: Option<i64>,
    users: &dyn UserRepository,
) -> Result<Vec<UserProfile>, DomainError> {
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(DomainError::Validation("offset must not be negative".into()));
    }
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    users.list(limit, offset).await
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use taleweave_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::application::command_handlers::handle_ensure_profile;
    use crate::in_memory::InMemoryUserRepository;

    #[tokio::test]
    async fn test_get_platform_stats_counts_users_seen_today() {
        // Arrange
        let users = InMemoryUserRepository::new();
        let today = FixedClock::default();
        let yesterday = FixedClock(today.0 - Duration::days(1));
        handle_ensure_profile(Uuid::new_v4(), "a@example.com", &yesterday, &users)
            .await
            .unwrap();
        handle_ensure_profile(Uuid::new_v4(), "b@example.com", &today, &users)
            .await
            .unwrap();

        // Act
        let stats = get_platform_stats(&today, &users).await.unwrap();

        // Assert
        assert_eq!(stats.users, 2);
        assert_eq!(stats.active_users_today, 1);
    }

    #[tokio::test]
    async fn test_list_users_pages_newest_first() {
        let users = InMemoryUserRepository::new();
        let clock = FixedClock::default();
        for (i, email) in ["a@x.io", "b@x.io", "c@x.io"].into_iter().enumerate() {
            let at = FixedClock(clock.0 + Duration::minutes(i64::try_from(i).unwrap()));
            handle_ensure_profile(Uuid::new_v4(), email, &at, &users)
                .await
                .unwrap();
        }

        let page = list_users(Some(2), Some(1), &users).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].email, "b@x.io");
        assert!(list_users(None, Some(-1), &users).await.is_err());
    }
}
