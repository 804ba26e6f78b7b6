//! Integration tests for `PgEventRepository`.

use chrono::Utc;
use sqlx::PgPool;
use taleweave_core::aggregate::{AggregateRoot, commit, load_existing};
use taleweave_core::error::DomainError;
use taleweave_core::repository::{EventRepository, StoredEvent};
use taleweave_credits::domain::aggregates::CreditAccount;
use taleweave_store::pg_event_repository::PgEventRepository;
use taleweave_test_support::FixedClock;
use uuid::Uuid;

fn stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: "conversation.message_exchanged".to_owned(),
        payload: serde_json::json!({ "MessageExchanged": { "beat_index": 0 } }),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_stream_loads_empty(pool: PgPool) {
    let repo = PgEventRepository::new(pool);

    let events = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(events.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_appended_events_load_in_sequence_order(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let session_id = Uuid::new_v4();
    let first = stored_event(session_id, 1);
    let second = stored_event(session_id, 2);

    // Act
    repo.append_events(session_id, 0, &[first.clone(), second.clone()])
        .await
        .unwrap();
    let loaded = repo.load_events(session_id).await.unwrap();

    // Assert
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].event_id, first.event_id);
    assert_eq!(loaded[0].payload, first.payload);
    assert_eq!(loaded[1].sequence_number, 2);
    assert_eq!(
        loaded[1].occurred_at.timestamp_micros(),
        second.occurred_at.timestamp_micros()
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_streams_are_isolated(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    repo.append_events(a, 0, &[stored_event(a, 1)]).await.unwrap();
    repo.append_events(b, 0, &[stored_event(b, 1)]).await.unwrap();

    assert_eq!(repo.load_events(a).await.unwrap().len(), 1);
    assert_eq!(repo.load_events(b).await.unwrap()[0].aggregate_id, b);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_stale_writer_gets_concurrency_conflict(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let session_id = Uuid::new_v4();
    repo.append_events(
        session_id,
        0,
        &[stored_event(session_id, 1), stored_event(session_id, 2)],
    )
    .await
    .unwrap();

    // Act
    let result = repo
        .append_events(session_id, 0, &[stored_event(session_id, 3)])
        .await;

    // Assert
    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected,
            actual,
        }) => {
            assert_eq!(aggregate_id, session_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(repo.load_events(session_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_empty_append_is_noop(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let id = Uuid::new_v4();

    repo.append_events(id, 0, &[]).await.unwrap();

    assert!(repo.load_events(id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_credit_account_survives_round_trip(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let clock = FixedClock::default();
    let user_id = Uuid::new_v4();
    let mut account = CreditAccount::new(user_id);
    account.grant(50, "signup", Uuid::new_v4(), &clock).unwrap();
    account.deduct(1, "message", Uuid::new_v4(), &clock).unwrap();

    // Act
    commit(&mut account, &repo).await.unwrap();
    let reloaded = load_existing(account.aggregate_id(), CreditAccount::new(user_id), &repo)
        .await
        .unwrap();

    // Assert
    assert_eq!(reloaded.balance(), 49);
    assert_eq!(reloaded.version(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_second_commit_from_same_snapshot_conflicts(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let clock = FixedClock::default();
    let user_id = Uuid::new_v4();
    let mut seed = CreditAccount::new(user_id);
    seed.grant(1, "signup", Uuid::new_v4(), &clock).unwrap();
    commit(&mut seed, &repo).await.unwrap();

    let mut first = load_existing(seed.aggregate_id(), CreditAccount::new(user_id), &repo)
        .await
        .unwrap();
    let mut second = load_existing(seed.aggregate_id(), CreditAccount::new(user_id), &repo)
        .await
        .unwrap();
    first.deduct(1, "message", Uuid::new_v4(), &clock).unwrap();
    second.deduct(1, "message", Uuid::new_v4(), &clock).unwrap();

    // Act
    commit(&mut first, &repo).await.unwrap();
    let result = commit(&mut second, &repo).await;

    // Assert
    assert!(matches!(result, Err(DomainError::ConcurrencyConflict { .. })));
}
