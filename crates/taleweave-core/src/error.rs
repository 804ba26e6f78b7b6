//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type shared by every bounded context.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A record looked up by id does not exist (or is not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. `"character"`.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// An event-sourced aggregate has no events.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller could not be identified.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is identified but not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A credit deduction exceeds the available balance.
    #[error("insufficient credits: {required} required, {available} available")]
    InsufficientCredits {
        /// Credits the operation costs.
        required: i64,
        /// Credits currently on the account.
        available: i64,
    },

    /// A usage limit (e.g. guest message cap) has been reached.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// An external provider (LLM, embeddings) failed or returned garbage.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
