//! Domain event envelope and payload abstractions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::DomainError;
use crate::repository::StoredEvent;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for deserialization routing.
    pub event_type: String,
    /// Aggregate/stream this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing version within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing a command through its effects.
    pub correlation_id: Uuid,
    /// Causation ID linking this event to the command that caused it.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Payload side of a domain event. Implemented by each context's event enum.
pub trait EventKind:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync
{
    /// The event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;
}

/// A payload plus its metadata, as produced by an aggregate.
#[derive(Debug, Clone)]
pub struct EventEnvelope<K> {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: K,
}

impl<K: EventKind> EventEnvelope<K> {
    /// Wraps `kind` for `aggregate_id` at `sequence_number`. The causation id
    /// is the correlation id, since events are caused directly by commands.
    #[must_use]
    pub fn new(
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
        kind: K,
    ) -> Self {
        Self {
            metadata: EventMetadata {
                event_id: Uuid::now_v7(),
                event_type: kind.event_type().to_owned(),
                aggregate_id,
                sequence_number,
                correlation_id,
                causation_id: correlation_id,
                occurred_at,
            },
            kind,
        }
    }

    /// Converts the envelope into its persisted form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the payload fails to serialize.
    pub fn to_stored(&self) -> Result<StoredEvent, DomainError> {
        let payload = serde_json::to_value(&self.kind).map_err(|e| {
            DomainError::Infrastructure(format!("event serialization failed: {e}"))
        })?;
        Ok(StoredEvent {
            event_id: self.metadata.event_id,
            aggregate_id: self.metadata.aggregate_id,
            event_type: self.metadata.event_type.clone(),
            payload,
            sequence_number: self.metadata.sequence_number,
            correlation_id: self.metadata.correlation_id,
            causation_id: self.metadata.causation_id,
            occurred_at: self.metadata.occurred_at,
        })
    }

    /// Rebuilds an envelope from its persisted form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the payload does not match `K`.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: K = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("event deserialization failed: {e}"))
        })?;
        Ok(Self {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Ping {
        Sent { count: u32 },
    }

    impl EventKind for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping_sent"
        }
    }

    #[test]
    fn test_envelope_survives_storage_round_trip() {
        // Arrange
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let envelope = EventEnvelope::new(aggregate_id, 3, correlation_id, at, Ping::Sent { count: 7 });

        // Act
        let stored = envelope.to_stored().unwrap();
        let restored = EventEnvelope::<Ping>::from_stored(&stored).unwrap();

        // Assert
        assert_eq!(stored.event_type, "test.ping_sent");
        assert_eq!(stored.causation_id, correlation_id);
        assert_eq!(restored.metadata, envelope.metadata);
        assert_eq!(restored.kind, Ping::Sent { count: 7 });
    }

    #[test]
    fn test_from_stored_rejects_foreign_payload() {
        let stored = StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: Uuid::new_v4(),
            event_type: "other.thing".to_owned(),
            payload: serde_json::json!({ "Unknown": {} }),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        };

        let result = EventEnvelope::<Ping>::from_stored(&stored);

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
