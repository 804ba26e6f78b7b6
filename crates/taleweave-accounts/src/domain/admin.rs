//! Admin allow-list.

use std::collections::HashSet;

use taleweave_core::error::DomainError;
use taleweave_core::identity::Viewer;

/// Emails of members with admin rights. Matching ignores case and
/// surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AdminAllowList {
    /// Parses a comma-separated list such as `"a@x.com, B@Y.com "`. Empty
    /// entries are dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            emails: raw
                .split(',')
                .map(normalize)
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Whether `email` is on the list.
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize(email))
    }

    /// Number of admins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Whether nobody is an admin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Whether `viewer` is an admin member.
    #[must_use]
    pub fn is_admin(&self, viewer: &Viewer) -> bool {
        match viewer {
            Viewer::Member { email, .. } => self.contains(email),
            Viewer::Guest { .. } => false,
        }
    }

    /// Fails unless `viewer` is an admin.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` for guests and
    /// `DomainError::Forbidden` for members not on the list.
    pub fn authorize(&self, viewer: &Viewer) -> Result<(), DomainError> {
        viewer.require_member()?;
        if self.is_admin(viewer) {
            Ok(())
        } else {
            Err(DomainError::Forbidden("admin access required".into()))
        }
    }
}
