//! Member profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member's profile, created the first time they are seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id (the token subject).
    pub id: Uuid,
    /// Email from the token.
    pub email: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// First sighting.
    pub created_at: DateTime<Utc>,
    /// Most recent sighting.
    pub last_seen_at: DateTime<Utc>,
}

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    /// Member profiles.
    pub users: i64,
    /// Members seen since the start of the current UTC day.
    pub active_users_today: i64,
    /// Characters.
    pub characters: i64,
    /// Episode sessions started.
    pub sessions: i64,
    /// Memories stored.
    pub memories: i64,
    /// Credits ever granted.
    pub credits_granted: i64,
    /// Credits ever spent, net of refunds.
    pub credits_spent: i64,
}
