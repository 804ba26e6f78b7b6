//! Commands for the Credits context.

use taleweave_core::command::Command;
use uuid::Uuid;

/// Command to add credits to a member's account.
#[derive(Debug, Clone)]
pub struct GrantCredits {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The member receiving credits.
    pub user_id: Uuid,
    /// Number of credits, at least 1.
    pub amount: i64,
    /// Why the credits were granted (e.g. `"signup"`, `"purchase"`).
    pub reason: String,
}

impl Command for GrantCredits {
    fn command_type(&self) -> &'static str {
        "credits.grant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pay a member's signup credits, at most once per account.
#[derive(Debug, Clone)]
pub struct GrantSignupCredits {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new member.
    pub user_id: Uuid,
    /// Number of credits, at least 1.
    pub amount: i64,
}

impl Command for GrantSignupCredits {
    fn command_type(&self) -> &'static str {
        "credits.grant_signup"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to spend credits from a member's account.
#[derive(Debug, Clone)]
pub struct DeductCredits {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The member spending credits.
    pub user_id: Uuid,
    /// Number of credits, at least 1.
    pub amount: i64,
    /// What the credits pay for (e.g. `"message"`).
    pub reason: String,
}

impl Command for DeductCredits {
    fn command_type(&self) -> &'static str {
        "credits.deduct"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to return credits for work that did not happen.
#[derive(Debug, Clone)]
pub struct RefundCredits {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The member being refunded.
    pub user_id: Uuid,
    /// Number of credits, at least 1.
    pub amount: i64,
    /// Why the refund happened.
    pub reason: String,
}

impl Command for RefundCredits {
    fn command_type(&self) -> &'static str {
        "credits.refund"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
