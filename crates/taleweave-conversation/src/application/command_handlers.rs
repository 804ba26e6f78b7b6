//! Command handlers for the conversation context.
//!
//! Each handler loads the session, executes one command method, and commits
//! the resulting events with optimistic concurrency. Handlers return the
//! session as it stands after the commit.

use serde::Serialize;
use taleweave_catalog::domain::repository::CatalogRepository;
use taleweave_characters::domain::repository::CharacterRepository;
use taleweave_core::aggregate::commit;
use taleweave_core::clock::Clock;
use taleweave_core::command::Command;
use taleweave_core::error::DomainError;
use taleweave_core::generation::{ChatMessage, CompletionRequest, TextGenerator};
use taleweave_core::repository::EventRepository;
use tracing::info;
use uuid::Uuid;

use super::query_handlers::{SessionView, load_owned_session};
use crate::domain::aggregates::{EpisodeSession, MAX_MESSAGE_CHARS, SessionPlan};
use crate::domain::commands::{AdvanceBeat, MakeChoice, SendMessage, StartEpisode};
use crate::domain::prompt::{PromptContext, compose_system_prompt};

/// Transcript messages sent along with each new player message.
pub const HISTORY_WINDOW: usize = 20;

/// Token budget for a character reply.
pub const REPLY_MAX_TOKENS: u32 = 800;

/// Sampling temperature for character replies.
pub const REPLY_TEMPERATURE: f32 = 0.8;

/// The character's reply to a player message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReply {
    /// What the character said.
    pub reply: String,
    /// The session after the exchange.
    pub session: SessionView,
}

async fn persist(
    session: &mut EpisodeSession,
    command: &dyn Command,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let stored = commit(session, repo).await?;
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = %session.id,
        events = stored.len(),
        completed = session.completed,
        "conversation command persisted"
    );
    Ok(SessionView::from(&*session))
}

/// Handles `StartEpisode`: checks the template is published and the
/// character is available, then starts a new session owned by the viewer.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown or unpublished template,
/// a template whose series is unpublished, or an unavailable character, and
/// `DomainError::Validation` when no character was given and the template
/// has none.
pub async fn handle_start_episode(
    command: &StartEpisode,
    clock: &dyn Clock,
    catalog: &dyn CatalogRepository,
    characters: &dyn CharacterRepository,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let template = catalog
        .find_episode(command.episode_template_id)
        .await?
        .filter(|t| t.is_published)
        .ok_or_else(|| DomainError::not_found("episode template", command.episode_template_id))?;
    catalog
        .find_series(template.series_id)
        .await?
        .filter(|s| s.is_published)
        .ok_or_else(|| DomainError::not_found("episode template", template.id))?;

    let character_id = command
        .character_id
        .or(template.character_id)
        .ok_or_else(|| {
            DomainError::Validation("this episode needs a character to be chosen".into())
        })?;
    let character = characters
        .find(character_id)
        .await?
        .filter(|c| c.is_visible_to(command.viewer.user_id()))
        .ok_or_else(|| DomainError::not_found("character", character_id))?;

    let mut session = EpisodeSession::new(Uuid::now_v7());
    session.start(
        SessionPlan {
            owner: command.viewer.owner(),
            episode_template_id: template.id,
            character_id: character.id,
            episode_title: template.title,
            situation: template.situation,
            beats: template.beats,
            opening_line: character.ignition.map(|i| i.opening_line),
        },
        command.correlation_id,
        clock,
    )?;
    persist(&mut session, command, repo).await
}

fn validate_message(content: &str) -> Result<&str, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation("message must not be empty".into()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(DomainError::Validation(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(content)
}

/// Handles `SendMessage`: composes the prompt, asks the generator for the
/// character's reply, and records the exchange (advancing the beat when its
/// exchange target is met).
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty or oversized message or a
/// completed session, `DomainError::LimitExceeded` for a guest at the message
/// cap, `DomainError::NotFound` for a foreign session, and
/// `DomainError::Upstream` if generation fails. Nothing is recorded on error.
pub async fn handle_send_message(
    command: &SendMessage,
    clock: &dyn Clock,
    generator: &dyn TextGenerator,
    characters: &dyn CharacterRepository,
    repo: &dyn EventRepository,
) -> Result<MessageReply, DomainError> {
    let content = validate_message(&command.content)?;
    let mut session = load_owned_session(command.session_id, &command.viewer, repo).await?;
    session.ensure_can_send()?;

    let character = characters
        .find(session.character_id())
        .await?
        .ok_or_else(|| DomainError::not_found("character", session.character_id()))?;
    let beat = session
        .current_beat()
        .ok_or_else(|| DomainError::Validation("episode is already complete".into()))?;

    let system = compose_system_prompt(&PromptContext {
        character: &character,
        ignition: character.ignition.as_ref(),
        situation: session.situation(),
        beat,
        choices: session.choices(),
        memories: &command.memories,
    });
    let transcript = session.transcript();
    let mut messages: Vec<ChatMessage> = transcript
        [transcript.len().saturating_sub(HISTORY_WINDOW)..]
        .iter()
        .map(|entry| ChatMessage {
            role: entry.role,
            content: entry.content.clone(),
        })
        .collect();
    messages.push(ChatMessage::user(content));

    let reply = generator
        .complete(&CompletionRequest {
            system,
            messages,
            max_tokens: REPLY_MAX_TOKENS,
            temperature: REPLY_TEMPERATURE,
        })
        .await?;
    let reply = reply.trim().to_owned();
    if reply.is_empty() {
        return Err(DomainError::Upstream("character reply was empty".into()));
    }

    session.record_exchange(content, &reply, command.correlation_id, clock)?;
    let view = persist(&mut session, command, repo).await?;
    Ok(MessageReply {
        reply,
        session: view,
    })
}

/// Handles `AdvanceBeat`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a completed session or an
/// unresolved choice point, and `DomainError::NotFound` for a foreign
/// session.
pub async fn handle_advance_beat(
    command: &AdvanceBeat,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let mut session = load_owned_session(command.session_id, &command.viewer, repo).await?;
    session.advance_beat(command.correlation_id, clock)?;
    persist(&mut session, command, repo).await
}

/// Handles `MakeChoice`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a beat without a choice point or an
/// unknown option, and `DomainError::NotFound` for a foreign session.
pub async fn handle_make_choice(
    command: &MakeChoice,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let mut session = load_owned_session(command.session_id, &command.viewer, repo).await?;
    session.make_choice(command.option_key.trim(), command.correlation_id, clock)?;
    persist(&mut session, command, repo).await
}
