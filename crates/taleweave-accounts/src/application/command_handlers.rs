//! Command handlers for the accounts context.

use serde::Serialize;
use taleweave_core::clock::Clock;
use taleweave_core::error::DomainError;
use tracing::info;
use uuid::Uuid;

use crate::domain::profile::UserProfile;
use crate::domain::repository::UserRepository;

/// A profile after [`handle_ensure_profile`].
#[derive(Debug, Clone, Serialize)]
pub struct EnsuredProfile {
    /// The profile.
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Whether this request created it. The caller grants signup credits
    /// exactly when this is set.
    #[serde(skip)]
    pub created: bool,
}

/// Creates the member's profile on first sight, otherwise records the
/// sighting.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank email, or any repository
/// error.
pub async fn handle_ensure_profile(
    user_id: Uuid,
    email: &str,
    clock: &dyn Clock,
    users: &dyn UserRepository,
) -> Result<EnsuredProfile, DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::Validation("email must not be empty".into()));
    }
    let now = clock.now();

    if let Some(mut profile) = users.find(user_id).await? {
        users.touch(user_id, now).await?;
        profile.last_seen_at = now;
        return Ok(EnsuredProfile {
            profile,
            created: false,
        });
    }

    let profile = UserProfile {
        id: user_id,
        email: email.to_owned(),
        display_name: None,
        created_at: now,
        last_seen_at: now,
    };
    let created = users.insert_if_absent(&profile).await?;
    if created {
        info!(%user_id, "member profile created");
        return Ok(EnsuredProfile { profile, created });
    }

    // Lost a race with a concurrent first request.
    let profile = users
        .find(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", user_id))?;
    Ok(EnsuredProfile {
        profile,
        created: false,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use taleweave_test_support::FixedClock;

    use super::*;
    use crate::in_memory::InMemoryUserRepository;

    #[tokio::test]
    async fn test_handle_ensure_profile_creates_once() {
        // Arrange
        let users = InMemoryUserRepository::new();
        let clock = FixedClock::default();
        let later = FixedClock(clock.0 + Duration::hours(2));
        let user_id = Uuid::new_v4();

        // Act
        let first = handle_ensure_profile(user_id, "ada@example.com", &clock, &users)
            .await
            .unwrap();
        let second = handle_ensure_profile(user_id, "ada@example.com", &later, &users)
            .await
            .unwrap();

        // Assert
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.profile.created_at, clock.0);
        assert_eq!(second.profile.last_seen_at, later.0);
        let stored = users.find(user_id).await.unwrap().unwrap();
        assert_eq!(stored.last_seen_at, later.0);
    }

    #[tokio::test]
    async fn test_handle_ensure_profile_rejects_blank_email() {
        let users = InMemoryUserRepository::new();

        let result =
            handle_ensure_profile(Uuid::new_v4(), "  ", &FixedClock::default(), &users).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
