//! Aggregate roots for the conversation context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleweave_catalog::domain::episode::Beat;
use taleweave_core::aggregate::AggregateRoot;
use taleweave_core::clock::Clock;
use taleweave_core::error::DomainError;
use taleweave_core::generation::ChatRole;
use taleweave_core::identity::{Owner, Viewer};
use uuid::Uuid;

use super::events::{
    BeatAdvanced, ChoiceMade, EpisodeCompleted, MessageExchanged, SessionEvent,
    SessionEventKind, SessionStarted,
};

/// User messages a guest may send in one session.
pub const GUEST_MESSAGE_LIMIT: u32 = 10;

/// Longest accepted player message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// A choice the player made, as remembered by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MadeChoice {
    /// Beat holding the choice point.
    pub beat_index: usize,
    /// Key of that beat.
    pub beat_key: String,
    /// Chosen option key.
    pub option_key: String,
    /// Chosen option label.
    pub label: String,
    /// Consequence fed into later prompts.
    pub consequence: String,
}

/// One turn of the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Who spoke.
    pub role: ChatRole,
    /// What was said.
    pub content: String,
    /// Beat active at the time.
    pub beat_index: usize,
    /// When it was said.
    pub occurred_at: DateTime<Utc>,
}

/// Input for [`EpisodeSession::start`].
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Who owns the session.
    pub owner: Owner,
    /// Template being played.
    pub episode_template_id: Uuid,
    /// Character being talked to.
    pub character_id: Uuid,
    /// Episode title.
    pub episode_title: String,
    /// Opening situation.
    pub situation: String,
    /// Beat plan to snapshot.
    pub beats: Vec<Beat>,
    /// Opening line from the character's ignition.
    pub opening_line: Option<String>,
}

/// The aggregate root for one played episode.
///
/// Command methods reason over committed state only; each handler loads a
/// fresh session, calls one command method, and commits.
#[derive(Debug)]
pub struct EpisodeSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) owner: Option<Owner>,
    pub(crate) episode_template_id: Uuid,
    pub(crate) character_id: Uuid,
    pub(crate) episode_title: String,
    pub(crate) situation: String,
    pub(crate) beats: Vec<Beat>,
    pub(crate) current_beat: usize,
    pub(crate) exchanges_in_beat: u32,
    pub(crate) user_messages: u32,
    pub(crate) choices: Vec<MadeChoice>,
    pub(crate) transcript: Vec<TranscriptEntry>,
    pub(crate) completed: bool,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<SessionEvent>,
}

impl EpisodeSession {
    /// Creates an empty session stream.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            owner: None,
            episode_template_id: Uuid::nil(),
            character_id: Uuid::nil(),
            episode_title: String::new(),
            situation: String::new(),
            beats: Vec::new(),
            current_beat: 0,
            exchanges_in_beat: 0,
            user_messages: 0,
            choices: Vec::new(),
            transcript: Vec::new(),
            completed: false,
            uncommitted_events: Vec::new(),
        }
    }

    fn record(&mut self, correlation_id: Uuid, clock: &dyn Clock, kind: SessionEventKind) {
        let event = SessionEvent::new(
            self.id,
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
            kind,
        );
        self.uncommitted_events.push(event);
    }

    /// Whether `viewer` owns the session.
    #[must_use]
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.owner.as_ref().is_some_and(|o| o.is_visible_to(viewer))
    }

    /// Whether the session belongs to a guest.
    #[must_use]
    pub fn is_guest_session(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|o| o.guest_session_id.is_some())
    }

    /// The active beat, or `None` once the episode is complete.
    #[must_use]
    pub fn current_beat(&self) -> Option<&Beat> {
        if self.completed {
            None
        } else {
            self.beats.get(self.current_beat)
        }
    }

    /// The character the session talks to.
    #[must_use]
    pub fn character_id(&self) -> Uuid {
        self.character_id
    }

    /// The opening situation.
    #[must_use]
    pub fn situation(&self) -> &str {
        &self.situation
    }

    /// Choices made so far, oldest first.
    #[must_use]
    pub fn choices(&self) -> &[MadeChoice] {
        &self.choices
    }

    /// The full transcript, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Messages left before a guest session hits its cap; `None` for members.
    #[must_use]
    pub fn guest_messages_remaining(&self) -> Option<u32> {
        self.is_guest_session()
            .then(|| GUEST_MESSAGE_LIMIT.saturating_sub(self.user_messages))
    }

    /// Starts the session, producing a `SessionStarted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session already started or
    /// the plan has no beats.
    pub fn start(
        &mut self,
        plan: SessionPlan,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.version > 0 || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Validation("session already started".into()));
        }
        if plan.beats.is_empty() {
            return Err(DomainError::Validation(
                "an episode needs at least one beat".into(),
            ));
        }
        let kind = SessionEventKind::SessionStarted(SessionStarted {
            owner: plan.owner,
            episode_template_id: plan.episode_template_id,
            character_id: plan.character_id,
            episode_title: plan.episode_title,
            situation: plan.situation,
            beats: plan.beats,
            opening_line: plan.opening_line,
        });
        self.record(correlation_id, clock, kind);
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<&Beat, DomainError> {
        if self.completed {
            return Err(DomainError::Validation("episode is already complete".into()));
        }
        self.beats
            .get(self.current_beat)
            .ok_or_else(|| DomainError::Validation("session has not started".into()))
    }

    /// Checks that the player may send another message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a completed session and
    /// `DomainError::LimitExceeded` once a guest has used up the session.
    pub fn ensure_can_send(&self) -> Result<(), DomainError> {
        self.ensure_in_progress()?;
        if self.guest_messages_remaining() == Some(0) {
            return Err(DomainError::LimitExceeded(format!(
                "guest sessions are limited to {GUEST_MESSAGE_LIMIT} messages; sign in to continue"
            )));
        }
        Ok(())
    }

    fn push_advance(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        let from_beat = self.current_beat;
        let kind = if from_beat + 1 < self.beats.len() {
            SessionEventKind::BeatAdvanced(BeatAdvanced {
                from_beat,
                to_beat: from_beat + 1,
            })
        } else {
            SessionEventKind::EpisodeCompleted(EpisodeCompleted {
                last_beat: from_beat,
            })
        };
        self.record(correlation_id, clock, kind);
    }

    /// Records a player message and the character's reply. When this fills
    /// the beat's exchange target and the beat has no choice point, the
    /// session also advances (or completes after the last beat).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`EpisodeSession::ensure_can_send`].
    pub fn record_exchange(
        &mut self,
        user_message: &str,
        reply: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_can_send()?;
        let beat = self.ensure_in_progress()?;
        let beat_done = self.exchanges_in_beat + 1 >= beat.target_exchanges && beat.choice.is_none();

        let kind = SessionEventKind::MessageExchanged(MessageExchanged {
            beat_index: self.current_beat,
            user_message: user_message.to_owned(),
            reply: reply.to_owned(),
        });
        self.record(correlation_id, clock, kind);
        if beat_done {
            self.push_advance(correlation_id, clock);
        }
        Ok(())
    }

    /// Moves to the next beat (or completes the episode).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a completed session or while the
    /// current beat waits on a choice.
    pub fn advance_beat(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        let beat = self.ensure_in_progress()?;
        if beat.choice.is_some() {
            return Err(DomainError::Validation(format!(
                "beat {:?} ends with a choice; make a choice to continue",
                beat.key
            )));
        }
        self.push_advance(correlation_id, clock);
        Ok(())
    }

    /// Resolves the current beat's choice point and ends the beat.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a completed session, a beat
    /// without a choice point, or an unknown option key.
    pub fn make_choice(
        &mut self,
        option_key: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let beat = self.ensure_in_progress()?;
        let choice = beat.choice.as_ref().ok_or_else(|| {
            DomainError::Validation(format!("beat {:?} has no choice to make", beat.key))
        })?;
        let option = choice.option(option_key).ok_or_else(|| {
            DomainError::Validation(format!("unknown option {option_key:?}"))
        })?;

        let kind = SessionEventKind::ChoiceMade(ChoiceMade {
            beat_index: self.current_beat,
            option_key: option.key.clone(),
            label: option.label.clone(),
            consequence: option.consequence.clone(),
        });
        self.record(correlation_id, clock, kind);
        self.push_advance(correlation_id, clock);
        Ok(())
    }
}

impl AggregateRoot for EpisodeSession {
    type Kind = SessionEventKind;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &SessionEvent) {
        let occurred_at = event.metadata.occurred_at;
        match &event.kind {
            SessionEventKind::SessionStarted(p) => {
                self.owner = Some(p.owner.clone());
                self.episode_template_id = p.episode_template_id;
                self.character_id = p.character_id;
                self.episode_title.clone_from(&p.episode_title);
                self.situation.clone_from(&p.situation);
                self.beats.clone_from(&p.beats);
                if let Some(line) = &p.opening_line {
                    self.transcript.push(TranscriptEntry {
                        role: ChatRole::Assistant,
                        content: line.clone(),
                        beat_index: 0,
                        occurred_at,
                    });
                }
            }
            SessionEventKind::MessageExchanged(p) => {
                self.transcript.push(TranscriptEntry {
                    role: ChatRole::User,
                    content: p.user_message.clone(),
                    beat_index: p.beat_index,
                    occurred_at,
                });
                self.transcript.push(TranscriptEntry {
                    role: ChatRole::Assistant,
                    content: p.reply.clone(),
                    beat_index: p.beat_index,
                    occurred_at,
                });
                self.exchanges_in_beat += 1;
                self.user_messages += 1;
            }
            SessionEventKind::BeatAdvanced(p) => {
                self.current_beat = p.to_beat;
                self.exchanges_in_beat = 0;
            }
            SessionEventKind::ChoiceMade(p) => {
                let beat_key = self
                    .beats
                    .get(p.beat_index)
                    .map(|b| b.key.clone())
                    .unwrap_or_default();
                self.choices.push(MadeChoice {
                    beat_index: p.beat_index,
                    beat_key,
                    option_key: p.option_key.clone(),
                    label: p.label.clone(),
                    consequence: p.consequence.clone(),
                });
            }
            SessionEventKind::EpisodeCompleted(_) => {
                self.completed = true;
                self.exchanges_in_beat = 0;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[SessionEvent] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
