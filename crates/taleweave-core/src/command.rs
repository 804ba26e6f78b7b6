//! Command abstractions.

use uuid::Uuid;

use crate::repository::StoredEvent;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}

/// Result of a command handled against an event-sourced aggregate.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// The aggregate affected or created by the command.
    pub aggregate_id: Uuid,
    /// The events produced and persisted, in sequence order.
    pub stored_events: Vec<StoredEvent>,
}

impl CommandOutcome {
    /// Identifiers of the persisted events.
    #[must_use]
    pub fn event_ids(&self) -> Vec<Uuid> {
        self.stored_events.iter().map(|e| e.event_id).collect()
    }

    /// Event type names of the persisted events, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&str> {
        self.stored_events
            .iter()
            .map(|e| e.event_type.as_str())
            .collect()
    }
}
