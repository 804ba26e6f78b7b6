//! Commands for the memory context.

use taleweave_core::command::Command;
use taleweave_core::identity::Viewer;
use uuid::Uuid;

/// Command to store a memory.
#[derive(Debug, Clone)]
pub struct Remember {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Whose memory it is.
    pub viewer: Viewer,
    /// The character that remembers.
    pub character_id: Uuid,
    /// What to remember.
    pub content: String,
    /// 1..=10; defaults to 5.
    pub importance: Option<i16>,
}

impl Command for Remember {
    fn command_type(&self) -> &'static str {
        "memory.remember"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a memory.
#[derive(Debug, Clone)]
pub struct Forget {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is asking.
    pub viewer: Viewer,
    /// The memory to delete.
    pub memory_id: Uuid,
}

impl Command for Forget {
    fn command_type(&self) -> &'static str {
        "memory.forget"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
