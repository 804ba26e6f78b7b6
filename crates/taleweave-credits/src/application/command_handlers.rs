//! Command handlers for the Credits context.
//!
//! Each handler loads the account, executes the command, and persists the
//! resulting events. The append is version-checked, so two concurrent
//! deductions against the same balance cannot both succeed.

use taleweave_core::aggregate::{commit, rehydrate};
use taleweave_core::clock::Clock;
use taleweave_core::command::{Command, CommandOutcome};
use taleweave_core::error::DomainError;
use taleweave_core::repository::EventRepository;
use tracing::info;
use uuid::Uuid;

use crate::domain::aggregates::{CreditAccount, SIGNUP_REASON, account_id_for};
use crate::domain::commands::{DeductCredits, GrantCredits, GrantSignupCredits, RefundCredits};

/// Loads the account for `user_id`. A member without events has an empty
/// account rather than a missing one.
///
/// # Errors
///
/// Returns `DomainError` if loading or deserialization fails.
pub(crate) async fn load_account(
    user_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<CreditAccount, DomainError> {
    let stored = repo.load_events(account_id_for(user_id)).await?;
    rehydrate(CreditAccount::new(user_id), &stored)
}

async fn persist(
    account: &mut CreditAccount,
    command: &dyn Command,
    repo: &dyn EventRepository,
) -> Result<CommandOutcome, DomainError> {
    let stored_events = commit(account, repo).await?;
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        account_id = %account.id,
        balance = account.balance(),
        "credits command persisted"
    );
    Ok(CommandOutcome {
        aggregate_id: account.id,
        stored_events,
    })
}

/// Handles the `GrantCredits` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive amount, or any
/// repository error.
pub async fn handle_grant_credits(
    command: &GrantCredits,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommandOutcome, DomainError> {
    let mut account = load_account(command.user_id, repo).await?;
    account.grant(command.amount, &command.reason, command.correlation_id, clock)?;
    persist(&mut account, command, repo).await
}

/// Handles the `GrantSignupCredits` command. Accounts that already hold a
/// signup grant are left untouched and yield `None`, so the command can be
/// retried until it succeeds once.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive amount,
/// `DomainError::ConcurrencyConflict` if another change landed first, or any
/// repository error.
pub async fn handle_grant_signup_credits(
    command: &GrantSignupCredits,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Option<CommandOutcome>, DomainError> {
    let mut account = load_account(command.user_id, repo).await?;
    if account.has_grant(SIGNUP_REASON) {
        return Ok(None);
    }
    account.grant(command.amount, SIGNUP_REASON, command.correlation_id, clock)?;
    persist(&mut account, command, repo).await.map(Some)
}

/// Handles the `DeductCredits` command.
///
/// # Errors
///
/// Returns `DomainError::InsufficientCredits` if the balance does not cover
/// the amount, `DomainError::ConcurrencyConflict` if another change landed
/// first, or any repository error.
pub async fn handle_deduct_credits(
    command: &DeductCredits,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommandOutcome, DomainError> {
    let mut account = load_account(command.user_id, repo).await?;
    account.deduct(command.amount, &command.reason, command.correlation_id, clock)?;
    persist(&mut account, command, repo).await
}

/// Handles the `RefundCredits` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the refund exceeds lifetime spend, or
/// any repository error.
pub async fn handle_refund_credits(
    command: &RefundCredits,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommandOutcome, DomainError> {
    let mut account = load_account(command.user_id, repo).await?;
    account.refund(command.amount, &command.reason, command.correlation_id, clock)?;
    persist(&mut account, command, repo).await
}
