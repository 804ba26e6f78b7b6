//! Query handlers for the conversation context.

use serde::Serialize;
use taleweave_catalog::domain::episode::ChoicePoint;
use taleweave_core::aggregate::rehydrate;
use taleweave_core::error::DomainError;
use taleweave_core::identity::Viewer;
use taleweave_core::repository::EventRepository;
use uuid::Uuid;

use crate::domain::aggregates::{EpisodeSession, MadeChoice, TranscriptEntry};
use crate::domain::events::SESSION_STARTED_EVENT_TYPE;

/// The active beat as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeatView {
    /// Position in the beat plan.
    pub index: usize,
    /// Beat key.
    pub key: String,
    /// Beat title.
    pub title: String,
    /// Exchanges before the beat completes.
    pub target_exchanges: u32,
    /// Exchanges so far in this beat.
    pub exchanges: u32,
    /// Pending decision, if the beat ends with one.
    pub choice: Option<ChoicePoint>,
}

/// Read model of an episode session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub id: Uuid,
    /// Template the session was started from.
    pub episode_template_id: Uuid,
    /// Character being talked to.
    pub character_id: Uuid,
    /// Episode title.
    pub episode_title: String,
    /// Opening situation.
    pub situation: String,
    /// Active beat; `None` once complete.
    pub current_beat: Option<BeatView>,
    /// Beats in the plan.
    pub beat_count: usize,
    /// Beats finished so far.
    pub beats_completed: usize,
    /// Whether the episode has ended.
    pub completed: bool,
    /// Choices made so far.
    pub choices: Vec<MadeChoice>,
    /// Player messages sent so far.
    pub message_count: u32,
    /// Messages left for a guest; absent for members.
    pub guest_messages_remaining: Option<u32>,
}

impl From<&EpisodeSession> for SessionView {
    fn from(session: &EpisodeSession) -> Self {
        let current_beat = session.current_beat().map(|beat| BeatView {
            index: session.current_beat,
            key: beat.key.clone(),
            title: beat.title.clone(),
            target_exchanges: beat.target_exchanges,
            exchanges: session.exchanges_in_beat,
            choice: beat.choice.clone(),
        });
        Self {
            id: session.id,
            episode_template_id: session.episode_template_id,
            character_id: session.character_id,
            episode_title: session.episode_title.clone(),
            situation: session.situation.clone(),
            current_beat,
            beat_count: session.beats.len(),
            beats_completed: if session.completed {
                session.beats.len()
            } else {
                session.current_beat
            },
            completed: session.completed,
            choices: session.choices.clone(),
            message_count: session.user_messages,
            guest_messages_remaining: session.guest_messages_remaining(),
        }
    }
}

/// Loads a session owned by `viewer`. Sessions owned by anyone else, and
/// streams that do not start with `SessionStarted`, are reported as missing.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for missing or foreign sessions.
pub(crate) async fn load_owned_session(
    session_id: Uuid,
    viewer: &Viewer,
    repo: &dyn EventRepository,
) -> Result<EpisodeSession, DomainError> {
    let stored = repo.load_events(session_id).await?;
    if stored
        .first()
        .is_none_or(|e| e.event_type != SESSION_STARTED_EVENT_TYPE)
    {
        return Err(DomainError::not_found("episode session", session_id));
    }
    let session = rehydrate(EpisodeSession::new(session_id), &stored)?;
    if !session.is_visible_to(viewer) {
        return Err(DomainError::not_found("episode session", session_id));
    }
    Ok(session)
}

/// Returns the viewer's session.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for missing or foreign sessions.
pub async fn get_session(
    session_id: Uuid,
    viewer: &Viewer,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let session = load_owned_session(session_id, viewer, repo).await?;
    Ok(SessionView::from(&session))
}

/// Returns the viewer's session transcript, oldest first.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for missing or foreign sessions.
pub async fn get_transcript(
    session_id: Uuid,
    viewer: &Viewer,
    repo: &dyn EventRepository,
) -> Result<Vec<TranscriptEntry>, DomainError> {
    let session = load_owned_session(session_id, viewer, repo).await?;
    Ok(session.transcript)
}
