//! Aggregate roots for the Credits context.

use chrono::{DateTime, Utc};
use taleweave_core::aggregate::AggregateRoot;
use taleweave_core::clock::Clock;
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::events::{
    CreditEvent, CreditEventKind, CreditsDeducted, CreditsGranted, CreditsRefunded,
};

/// Namespace for deriving account stream ids from user ids.
const ACCOUNT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1e_2c4a_9b3d_4e8f_a1c0_77d2_5b9e_c3a1);

/// Returns the event stream id of `user_id`'s credit account.
#[must_use]
pub fn account_id_for(user_id: Uuid) -> Uuid {
    Uuid::new_v5(&ACCOUNT_NAMESPACE, user_id.as_bytes())
}

/// Credits a member pays per chat message.
pub const MESSAGE_COST: i64 = 1;

/// Credits granted when a member profile is first created, unless configured.
pub const DEFAULT_SIGNUP_GRANT: i64 = 50;

/// Ledger reason recorded on the signup grant.
pub const SIGNUP_REASON: &str = "signup";

/// One line of the account history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Signed change to the balance.
    pub delta: i64,
    /// Reason recorded with the change.
    pub reason: String,
    /// When the change happened.
    pub occurred_at: DateTime<Utc>,
}

/// The aggregate root for a member's credit account.
#[derive(Debug)]
pub struct CreditAccount {
    /// Aggregate identifier (see [`account_id_for`]).
    pub id: Uuid,
    /// The member owning the account.
    pub user_id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Credits available.
    pub(crate) balance: i64,
    /// Lifetime credits granted or refunded.
    pub(crate) total_credited: i64,
    /// Lifetime credits spent.
    pub(crate) total_spent: i64,
    /// Every balance change, oldest first.
    pub(crate) ledger: Vec<LedgerEntry>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<CreditEvent>,
}

fn require_positive(amount: i64) -> Result<(), DomainError> {
    if amount < 1 {
        return Err(DomainError::Validation(format!(
            "credit amount must be at least 1, got {amount}"
        )));
    }
    Ok(())
}

impl CreditAccount {
    /// Creates an empty account for `user_id`.
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: account_id_for(user_id),
            user_id,
            version: 0,
            balance: 0,
            total_credited: 0,
            total_spent: 0,
            ledger: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Credits available, including uncommitted changes.
    #[must_use]
    pub fn balance(&self) -> i64 {
        self.uncommitted_events
            .iter()
            .fold(self.balance, |balance, event| match &event.kind {
                CreditEventKind::CreditsGranted(p) => balance + p.amount,
                CreditEventKind::CreditsRefunded(p) => balance + p.amount,
                CreditEventKind::CreditsDeducted(p) => balance - p.amount,
            })
    }

    /// Whether a credit with `reason` has been granted, including uncommitted
    /// grants.
    #[must_use]
    pub fn has_grant(&self, reason: &str) -> bool {
        self.ledger.iter().any(|e| e.delta > 0 && e.reason == reason)
            || self.uncommitted_events.iter().any(|event| {
                matches!(&event.kind, CreditEventKind::CreditsGranted(p) if p.reason == reason)
            })
    }

    fn record(&mut self, correlation_id: Uuid, clock: &dyn Clock, kind: CreditEventKind) {
        let event = CreditEvent::new(
            self.id,
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
            kind,
        );
        self.uncommitted_events.push(event);
    }

    /// Adds credits, producing a `CreditsGranted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `amount` is below 1.
    pub fn grant(
        &mut self,
        amount: i64,
        reason: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_positive(amount)?;
        let kind = CreditEventKind::CreditsGranted(CreditsGranted {
            user_id: self.user_id,
            amount,
            reason: reason.to_owned(),
        });
        self.record(correlation_id, clock, kind);
        Ok(())
    }

    /// Spends credits, producing a `CreditsDeducted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `amount` is below 1, or
    /// `DomainError::InsufficientCredits` if the balance does not cover it.
    pub fn deduct(
        &mut self,
        amount: i64,
        reason: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_positive(amount)?;
        let available = self.balance();
        if available < amount {
            return Err(DomainError::InsufficientCredits {
                required: amount,
                available,
            });
        }
        let kind = CreditEventKind::CreditsDeducted(CreditsDeducted {
            user_id: self.user_id,
            amount,
            reason: reason.to_owned(),
            balance_after: available - amount,
        });
        self.record(correlation_id, clock, kind);
        Ok(())
    }

    /// Returns credits, producing a `CreditsRefunded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `amount` is below 1 or exceeds
    /// what the account has ever spent.
    pub fn refund(
        &mut self,
        amount: i64,
        reason: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        require_positive(amount)?;
        if amount > self.total_spent {
            return Err(DomainError::Validation(format!(
                "cannot refund {amount} credits; only {} were ever spent",
                self.total_spent
            )));
        }
        let kind = CreditEventKind::CreditsRefunded(CreditsRefunded {
            user_id: self.user_id,
            amount,
            reason: reason.to_owned(),
        });
        self.record(correlation_id, clock, kind);
        Ok(())
    }
}

impl AggregateRoot for CreditAccount {
    type Kind = CreditEventKind;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &CreditEvent) {
        let (delta, reason) = match &event.kind {
            CreditEventKind::CreditsGranted(p) => {
                self.total_credited += p.amount;
                (p.amount, &p.reason)
            }
            CreditEventKind::CreditsRefunded(p) => {
                self.total_credited += p.amount;
                self.total_spent -= p.amount;
                (p.amount, &p.reason)
            }
            CreditEventKind::CreditsDeducted(p) => {
                self.total_spent += p.amount;
                (-p.amount, &p.reason)
            }
        };
        self.balance += delta;
        self.ledger.push(LedgerEntry {
            delta,
            reason: reason.clone(),
            occurred_at: event.metadata.occurred_at,
        });
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[CreditEvent] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<CreditEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweave_core::event::EventEnvelope;
    use taleweave_test_support::{FixedClock, fixed_now};

    fn committed(mut account: CreditAccount) -> CreditAccount {
        for event in account.take_uncommitted_events() {
            account.apply(&event);
        }
        account
    }

    #[test]
    fn test_grant_produces_credits_granted_event() {
        // Arrange
        let user_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(user_id);

        // Act
        account.grant(50, "signup", correlation_id, &clock).unwrap();

        // Assert
        let events = account.uncommitted_events();
        assert_eq!(events.len(), 1);
        let meta = &events[0].metadata;
        assert_eq!(meta.event_type, "credits.granted");
        assert_eq!(meta.aggregate_id, account_id_for(user_id));
        assert_eq!(meta.sequence_number, 1);
        assert_eq!(meta.correlation_id, correlation_id);
        assert_eq!(meta.occurred_at, fixed_now());
        assert_eq!(account.balance(), 50);
    }

    #[test]
    fn test_deduct_within_balance_records_balance_after() {
        // Arrange
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());
        account.grant(3, "signup", Uuid::new_v4(), &clock).unwrap();
        let mut account = committed(account);

        // Act
        account.deduct(2, "message", Uuid::new_v4(), &clock).unwrap();

        // Assert
        match &account.uncommitted_events()[0].kind {
            CreditEventKind::CreditsDeducted(p) => {
                assert_eq!(p.amount, 2);
                assert_eq!(p.balance_after, 1);
            }
            other => panic!("expected CreditsDeducted, got {other:?}"),
        }
        assert_eq!(account.uncommitted_events()[0].metadata.sequence_number, 2);
    }

    #[test]
    fn test_deduct_beyond_balance_is_rejected() {
        // Arrange
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());
        account.grant(1, "signup", Uuid::new_v4(), &clock).unwrap();
        let mut account = committed(account);

        // Act
        let result = account.deduct(2, "message", Uuid::new_v4(), &clock);

        // Assert
        match result {
            Err(DomainError::InsufficientCredits {
                required,
                available,
            }) => {
                assert_eq!(required, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientCredits, got {other:?}"),
        }
        assert!(account.uncommitted_events().is_empty());
        assert_eq!(account.balance(), 1);
    }

    #[test]
    fn test_successive_uncommitted_deductions_cannot_overdraw() {
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());
        account.grant(1, "signup", Uuid::new_v4(), &clock).unwrap();

        account.deduct(1, "message", Uuid::new_v4(), &clock).unwrap();
        let second = account.deduct(1, "message", Uuid::new_v4(), &clock);

        assert!(matches!(
            second,
            Err(DomainError::InsufficientCredits { available: 0, .. })
        ));
        assert_eq!(account.balance(), 0);
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());

        assert!(matches!(
            account.grant(0, "nothing", Uuid::new_v4(), &clock),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            account.deduct(-5, "negative", Uuid::new_v4(), &clock),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_refund_cannot_exceed_lifetime_spend() {
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());
        account.grant(5, "signup", Uuid::new_v4(), &clock).unwrap();
        account.deduct(1, "message", Uuid::new_v4(), &clock).unwrap();
        let mut account = committed(account);

        assert!(account.refund(2, "generation failed", Uuid::new_v4(), &clock).is_err());
        account
            .refund(1, "generation failed", Uuid::new_v4(), &clock)
            .unwrap();
        assert_eq!(account.balance(), 5);
    }

    #[test]
    fn test_apply_builds_ledger_in_order() {
        let clock = FixedClock::default();
        let mut account = CreditAccount::new(Uuid::new_v4());
        account.grant(10, "signup", Uuid::new_v4(), &clock).unwrap();
        account.deduct(4, "message", Uuid::new_v4(), &clock).unwrap();
        let events: Vec<EventEnvelope<CreditEventKind>> = account.take_uncommitted_events();
        for event in &events {
            account.apply(event);
        }

        assert_eq!(account.version(), 2);
        assert_eq!(account.balance, 6);
        assert_eq!(
            account.ledger.iter().map(|e| e.delta).collect::<Vec<_>>(),
            vec![10, -4]
        );
        assert_eq!(account.total_spent, 4);
    }
}
