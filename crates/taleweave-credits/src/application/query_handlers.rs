//! Query handlers for the Credits context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleweave_core::error::DomainError;
use taleweave_core::repository::EventRepository;
use uuid::Uuid;

use crate::application::command_handlers::load_account;

/// Number of ledger entries included in a balance view.
pub const RECENT_LEDGER_ENTRIES: usize = 20;

/// A ledger line as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryView {
    /// Signed change to the balance.
    pub delta: i64,
    /// Reason recorded with the change.
    pub reason: String,
    /// When the change happened.
    pub occurred_at: DateTime<Utc>,
}

/// Read-only view of a credit account.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    /// The member owning the account.
    pub user_id: Uuid,
    /// Credits available.
    pub balance: i64,
    /// Lifetime credits granted or refunded.
    pub total_credited: i64,
    /// Lifetime credits spent.
    pub total_spent: i64,
    /// Most recent entries, newest first.
    pub recent: Vec<LedgerEntryView>,
}

/// Returns the balance and recent history for `user_id`. Accounts without
/// history report a zero balance.
///
/// # Errors
///
/// Returns `DomainError` if loading or deserialization fails.
pub async fn get_balance(
    user_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<BalanceView, DomainError> {
    let account = load_account(user_id, repo).await?;
    let recent = account
        .ledger
        .iter()
        .rev()
        .take(RECENT_LEDGER_ENTRIES)
        .map(|entry| LedgerEntryView {
            delta: entry.delta,
            reason: entry.reason.clone(),
            occurred_at: entry.occurred_at,
        })
        .collect();
    Ok(BalanceView {
        user_id,
        balance: account.balance(),
        total_credited: account.total_credited,
        total_spent: account.total_spent,
        recent,
    })
}
