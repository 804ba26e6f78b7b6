//! Aggregate root abstraction.

use uuid::Uuid;

use crate::error::DomainError;
use crate::event::{EventEnvelope, EventKind};
use crate::repository::{EventRepository, StoredEvent};

/// Trait for aggregate roots that reconstitute from event history.
pub trait AggregateRoot: Send + Sync {
    /// The event payload type this aggregate produces and consumes.
    type Kind: EventKind;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &EventEnvelope<Self::Kind>);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[EventEnvelope<Self::Kind>];

    /// Removes and returns the uncommitted events.
    fn take_uncommitted_events(&mut self) -> Vec<EventEnvelope<Self::Kind>>;

    /// Sequence number for the next event this aggregate records.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version() + self.uncommitted_events().len() as i64 + 1
    }
}

/// Replays `stored` onto a fresh aggregate.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if any payload fails to deserialize.
pub fn rehydrate<A: AggregateRoot>(mut aggregate: A, stored: &[StoredEvent]) -> Result<A, DomainError> {
    for event in stored {
        let envelope = EventEnvelope::<A::Kind>::from_stored(event)?;
        aggregate.apply(&envelope);
    }
    Ok(aggregate)
}

/// Loads an existing aggregate, failing when its stream is empty.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an empty stream, or any
/// repository/deserialization error.
pub async fn load_existing<A: AggregateRoot>(
    aggregate_id: Uuid,
    blank: A,
    repo: &dyn EventRepository,
) -> Result<A, DomainError> {
    let stored = repo.load_events(aggregate_id).await?;
    if stored.is_empty() {
        return Err(DomainError::AggregateNotFound(aggregate_id));
    }
    rehydrate(blank, &stored)
}

/// Persists the aggregate's uncommitted events with optimistic concurrency,
/// applies them so the in-memory state matches the stream, and returns the
/// stored events.
///
/// # Errors
///
/// Returns `DomainError` if serialization or appending fails. On a
/// concurrency conflict nothing is applied.
pub async fn commit<A: AggregateRoot>(
    aggregate: &mut A,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let pending = aggregate.take_uncommitted_events();
    let stored = pending
        .iter()
        .map(EventEnvelope::to_stored)
        .collect::<Result<Vec<_>, _>>()?;

    if stored.is_empty() {
        return Ok(stored);
    }

    repo.append_events(aggregate.aggregate_id(), aggregate.version(), &stored)
        .await?;

    for event in &pending {
        aggregate.apply(event);
    }
    Ok(stored)
}
