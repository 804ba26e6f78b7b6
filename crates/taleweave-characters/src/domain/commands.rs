//! Commands for the characters context.

use taleweave_core::command::Command;
use uuid::Uuid;

use super::character::{CharacterUpdate, NewCharacter};

/// Command to create a character and run its ignition.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The creating member.
    pub creator_id: Uuid,
    /// Character fields.
    pub input: NewCharacter,
}

impl Command for CreateCharacter {
    fn command_type(&self) -> &'static str {
        "characters.create_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to update a character's definition.
#[derive(Debug, Clone)]
pub struct UpdateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting member.
    pub actor_id: Uuid,
    /// The character to update.
    pub character_id: Uuid,
    /// Fields to change.
    pub update: CharacterUpdate,
}

impl Command for UpdateCharacter {
    fn command_type(&self) -> &'static str {
        "characters.update_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to re-run a character's ignition.
#[derive(Debug, Clone)]
pub struct RegenerateIgnition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting member.
    pub actor_id: Uuid,
    /// The character to re-ignite.
    pub character_id: Uuid,
}

impl Command for RegenerateIgnition {
    fn command_type(&self) -> &'static str {
        "characters.regenerate_ignition"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a character.
#[derive(Debug, Clone)]
pub struct DeleteCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The acting member.
    pub actor_id: Uuid,
    /// The character to delete.
    pub character_id: Uuid,
}

impl Command for DeleteCharacter {
    fn command_type(&self) -> &'static str {
        "characters.delete_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
