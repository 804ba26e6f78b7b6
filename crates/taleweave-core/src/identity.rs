//! Who is making a request.
//!
//! Anonymous visitors all share one placeholder user record so guest flows
//! can reuse the member code paths. Isolation between guests comes from the
//! client-generated session id, never from distinct user rows.

use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use crate::error::DomainError;

/// The single user id shared by every guest session.
pub const GUEST_USER_ID: Uuid = uuid!("00000000-0000-0000-0000-00000000a11e");

/// Maximum length of a guest session identifier.
pub const MAX_GUEST_SESSION_ID_LEN: usize = 128;

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewer {
    /// An authenticated member.
    Member {
        /// The member's user id.
        user_id: Uuid,
        /// The member's email address.
        email: String,
    },
    /// An anonymous visitor identified by a disposable session id.
    Guest {
        /// The client-generated session identifier.
        session_id: String,
    },
}

impl Viewer {
    /// Builds a member viewer, refusing the reserved guest id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if `user_id` is the guest user id.
    pub fn member(user_id: Uuid, email: impl Into<String>) -> Result<Self, DomainError> {
        if user_id == GUEST_USER_ID {
            return Err(DomainError::Unauthorized(
                "reserved user id cannot authenticate".into(),
            ));
        }
        Ok(Self::Member {
            user_id,
            email: email.into(),
        })
    }

    /// Builds a guest viewer after validating the session id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if the session id is empty, too
    /// long, or contains characters outside `[A-Za-z0-9_-]`.
    pub fn guest(session_id: &str) -> Result<Self, DomainError> {
        let session_id = session_id.trim();
        let valid = !session_id.is_empty()
            && session_id.len() <= MAX_GUEST_SESSION_ID_LEN
            && session_id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(DomainError::Unauthorized("invalid guest session id".into()));
        }
        Ok(Self::Guest {
            session_id: session_id.to_owned(),
        })
    }

    /// The user id records are stored under.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Member { user_id, .. } => *user_id,
            Self::Guest { .. } => GUEST_USER_ID,
        }
    }

    /// The guest session id, if this is a guest.
    #[must_use]
    pub fn guest_session_id(&self) -> Option<&str> {
        match self {
            Self::Member { .. } => None,
            Self::Guest { session_id } => Some(session_id),
        }
    }

    /// Whether this viewer is a guest.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// The owner key for records this viewer creates.
    #[must_use]
    pub fn owner(&self) -> Owner {
        Owner {
            user_id: self.user_id(),
            guest_session_id: self.guest_session_id().map(str::to_owned),
        }
    }

    /// Returns the member id, or `Unauthorized` for guests.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` for guest viewers.
    pub fn require_member(&self) -> Result<Uuid, DomainError> {
        match self {
            Self::Member { user_id, .. } => Ok(*user_id),
            Self::Guest { .. } => Err(DomainError::Unauthorized(
                "sign in to use this feature".into(),
            )),
        }
    }
}

/// Ownership key persisted on user-scoped records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Owning user id (the guest id for guest records).
    pub user_id: Uuid,
    /// Guest session id for guest records.
    pub guest_session_id: Option<String>,
}

impl Owner {
    /// Whether `viewer` may access a record owned by `self`. Guests must
    /// match on session id as well, since they share a user id.
    #[must_use]
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.user_id == viewer.user_id()
            && self.guest_session_id.as_deref() == viewer.guest_session_id()
    }
}
