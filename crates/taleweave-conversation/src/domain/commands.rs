//! Commands for the conversation context.

use taleweave_core::command::Command;
use taleweave_core::identity::Viewer;
use uuid::Uuid;

/// Command to start an episode session.
#[derive(Debug, Clone)]
pub struct StartEpisode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is playing.
    pub viewer: Viewer,
    /// Template to play.
    pub episode_template_id: Uuid,
    /// Character to talk to instead of the template's own.
    pub character_id: Option<Uuid>,
}

impl Command for StartEpisode {
    fn command_type(&self) -> &'static str {
        "conversation.start_episode"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to send a player message.
#[derive(Debug, Clone)]
pub struct SendMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is playing.
    pub viewer: Viewer,
    /// Target session.
    pub session_id: Uuid,
    /// The player's message.
    pub content: String,
    /// Memories recalled for this message, most relevant first.
    pub memories: Vec<String>,
}

impl Command for SendMessage {
    fn command_type(&self) -> &'static str {
        "conversation.send_message"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to move to the next beat.
#[derive(Debug, Clone)]
pub struct AdvanceBeat {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is playing.
    pub viewer: Viewer,
    /// Target session.
    pub session_id: Uuid,
}

impl Command for AdvanceBeat {
    fn command_type(&self) -> &'static str {
        "conversation.advance_beat"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to resolve the current choice point.
#[derive(Debug, Clone)]
pub struct MakeChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who is playing.
    pub viewer: Viewer,
    /// Target session.
    pub session_id: Uuid,
    /// Chosen option key.
    pub option_key: String,
}

impl Command for MakeChoice {
    fn command_type(&self) -> &'static str {
        "conversation.make_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
