//! Domain events for the Credits context.

use serde::{Deserialize, Serialize};
use taleweave_core::event::{EventEnvelope, EventKind};
use uuid::Uuid;

/// Emitted when credits are added to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsGranted {
    /// The member the account belongs to.
    pub user_id: Uuid,
    /// Credits added.
    pub amount: i64,
    /// Why the credits were granted.
    pub reason: String,
}

/// Emitted when credits are spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsDeducted {
    /// The member the account belongs to.
    pub user_id: Uuid,
    /// Credits removed.
    pub amount: i64,
    /// What the credits paid for.
    pub reason: String,
    /// Balance after the deduction.
    pub balance_after: i64,
}

/// Emitted when spent credits are returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsRefunded {
    /// The member the account belongs to.
    pub user_id: Uuid,
    /// Credits returned.
    pub amount: i64,
    /// Why the refund happened.
    pub reason: String,
}

/// Event type identifier for [`CreditsGranted`].
pub const CREDITS_GRANTED_EVENT_TYPE: &str = "credits.granted";

/// Event type identifier for [`CreditsDeducted`].
pub const CREDITS_DEDUCTED_EVENT_TYPE: &str = "credits.deducted";

/// Event type identifier for [`CreditsRefunded`].
pub const CREDITS_REFUNDED_EVENT_TYPE: &str = "credits.refunded";

/// Event payload variants for the Credits context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditEventKind {
    /// Credits were granted.
    CreditsGranted(CreditsGranted),
    /// Credits were deducted.
    CreditsDeducted(CreditsDeducted),
    /// Credits were refunded.
    CreditsRefunded(CreditsRefunded),
}

impl EventKind for CreditEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            Self::CreditsGranted(_) => CREDITS_GRANTED_EVENT_TYPE,
            Self::CreditsDeducted(_) => CREDITS_DEDUCTED_EVENT_TYPE,
            Self::CreditsRefunded(_) => CREDITS_REFUNDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Credits context.
pub type CreditEvent = EventEnvelope<CreditEventKind>;
