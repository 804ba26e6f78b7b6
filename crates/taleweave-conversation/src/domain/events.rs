//! Domain events for the conversation context.

use serde::{Deserialize, Serialize};
use taleweave_catalog::domain::episode::Beat;
use taleweave_core::event::{EventEnvelope, EventKind};
use taleweave_core::identity::Owner;
use uuid::Uuid;

/// Emitted when a player starts an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// Who may read and continue the session.
    pub owner: Owner,
    /// The template the session was started from.
    pub episode_template_id: Uuid,
    /// The character the player talks to.
    pub character_id: Uuid,
    /// Episode title at start time.
    pub episode_title: String,
    /// Opening situation at start time.
    pub situation: String,
    /// Beat plan at start time. Later template edits do not reach running
    /// sessions.
    pub beats: Vec<Beat>,
    /// The character's ignition opening line, shown as the first turn.
    pub opening_line: Option<String>,
}

/// Emitted for every player message and the character's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExchanged {
    /// Beat active when the message was sent.
    pub beat_index: usize,
    /// What the player said.
    pub user_message: String,
    /// What the character replied.
    pub reply: String,
}

/// Emitted when the session moves on to the next beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatAdvanced {
    /// The beat being left.
    pub from_beat: usize,
    /// The beat now active.
    pub to_beat: usize,
}

/// Emitted when the player picks an option at a choice point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMade {
    /// Beat holding the choice point.
    pub beat_index: usize,
    /// Key of the chosen option.
    pub option_key: String,
    /// Label of the chosen option.
    pub label: String,
    /// Consequence fed into later prompts.
    pub consequence: String,
}

/// Emitted when the last beat ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeCompleted {
    /// The final beat.
    pub last_beat: usize,
}

/// Event type identifier for [`SessionStarted`].
pub const SESSION_STARTED_EVENT_TYPE: &str = "conversation.session_started";

/// Event type identifier for [`MessageExchanged`].
pub const MESSAGE_EXCHANGED_EVENT_TYPE: &str = "conversation.message_exchanged";

/// Event type identifier for [`BeatAdvanced`].
pub const BEAT_ADVANCED_EVENT_TYPE: &str = "conversation.beat_advanced";

/// Event type identifier for [`ChoiceMade`].
pub const CHOICE_MADE_EVENT_TYPE: &str = "conversation.choice_made";

/// Event type identifier for [`EpisodeCompleted`].
pub const EPISODE_COMPLETED_EVENT_TYPE: &str = "conversation.episode_completed";

/// Event payload variants for the conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The session started.
    SessionStarted(SessionStarted),
    /// A message was exchanged.
    MessageExchanged(MessageExchanged),
    /// The session moved to the next beat.
    BeatAdvanced(BeatAdvanced),
    /// The player made a choice.
    ChoiceMade(ChoiceMade),
    /// The episode ended.
    EpisodeCompleted(EpisodeCompleted),
}

impl EventKind for SessionEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => SESSION_STARTED_EVENT_TYPE,
            Self::MessageExchanged(_) => MESSAGE_EXCHANGED_EVENT_TYPE,
            Self::BeatAdvanced(_) => BEAT_ADVANCED_EVENT_TYPE,
            Self::ChoiceMade(_) => CHOICE_MADE_EVENT_TYPE,
            Self::EpisodeCompleted(_) => EPISODE_COMPLETED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the conversation context.
pub type SessionEvent = EventEnvelope<SessionEventKind>;
