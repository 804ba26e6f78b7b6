//! Episode session routes.
//!
//! Sending a message is billed: members pay [`MESSAGE_COST`] up front and
//! are refunded when the exchange fails. Guests are capped by the session
//! instead.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_conversation::application::command_handlers::{
    MessageReply, handle_advance_beat, handle_make_choice, handle_send_message,
    handle_start_episode,
};
use taleweave_conversation::application::query_handlers::{
    SessionView, get_session, get_transcript,
};
use taleweave_conversation::domain::aggregates::TranscriptEntry;
use taleweave_conversation::domain::commands::{AdvanceBeat, MakeChoice, SendMessage, StartEpisode};
use taleweave_conversation::domain::prompt::MAX_PROMPT_MEMORIES;
use taleweave_core::error::DomainError;
use taleweave_core::identity::Viewer;
use taleweave_credits::application::command_handlers::{
    handle_deduct_credits, handle_refund_credits,
};
use taleweave_credits::domain::aggregates::MESSAGE_COST;
use taleweave_credits::domain::commands::{DeductCredits, RefundCredits};
use taleweave_memory::application::query_handlers::recall;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::auth::CurrentViewer;
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

/// Body of `POST /episodes`.
#[derive(Debug, Deserialize)]
pub struct StartEpisodeRequest {
    /// Template to play.
    pub episode_template_id: Uuid,
    /// Character to talk to instead of the template's own.
    pub character_id: Option<Uuid>,
}

/// Body of `POST /episodes/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// The player's message.
    pub content: String,
}

/// Body of `POST /episodes/{id}/choice`.
#[derive(Debug, Deserialize)]
pub struct MakeChoiceRequest {
    /// Chosen option key.
    pub option_key: String,
}

#[instrument(skip_all, fields(episode_template_id = %request.episode_template_id))]
async fn start(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Json(request): Json<StartEpisodeRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let command = StartEpisode {
        correlation_id: correlation_id(),
        viewer,
        episode_template_id: request.episode_template_id,
        character_id: request.character_id,
    };
    let session = handle_start_episode(
        &command,
        state.clock.as_ref(),
        state.catalog.as_ref(),
        state.characters.as_ref(),
        state.events.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip_all, fields(%session_id))]
async fn show(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(
        get_session(session_id, &viewer, state.events.as_ref()).await?,
    ))
}

#[instrument(skip_all, fields(%session_id))]
async fn transcript(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<TranscriptEntry>>, ApiError> {
    Ok(Json(
        get_transcript(session_id, &viewer, state.events.as_ref()).await?,
    ))
}

/// Memory contents to weave into the prompt, most relevant first. Recall
/// problems only cost context, so they are logged and skipped.
async fn prompt_memories(
    state: &AppState,
    viewer: &Viewer,
    character_id: Uuid,
    content: &str,
) -> Vec<String> {
    match recall(
        viewer,
        character_id,
        Some(content),
        Some(MAX_PROMPT_MEMORIES),
        state.embedder.as_ref(),
        state.memories.as_ref(),
    )
    .await
    {
        Ok(recalled) => recalled.into_iter().map(|r| r.memory.content).collect(),
        Err(e) => {
            warn!(%character_id, error = %e, "memory recall failed; replying without memories");
            Vec::new()
        }
    }
}

async fn refund_message(state: &AppState, user_id: Uuid, correlation_id: Uuid) {
    let command = RefundCredits {
        correlation_id,
        user_id,
        amount: MESSAGE_COST,
        reason: "message failed".into(),
    };
    if let Err(e) =
        handle_refund_credits(&command, state.clock.as_ref(), state.events.as_ref()).await
    {
        error!(%user_id, %correlation_id, error = %e, "message refund failed");
    }
}

#[instrument(skip_all, fields(%session_id))]
async fn send_message(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageReply>, ApiError> {
    let correlation_id = correlation_id();
    let session = get_session(session_id, &viewer, state.events.as_ref()).await?;
    if session.completed {
        return Err(DomainError::Validation("this episode has already ended".into()).into());
    }
    let memories = prompt_memories(&state, &viewer, session.character_id, &request.content).await;

    let billed = match &viewer {
        Viewer::Member { user_id, .. } => Some(*user_id),
        Viewer::Guest { .. } => None,
    };
    if let Some(user_id) = billed {
        let charge = DeductCredits {
            correlation_id,
            user_id,
            amount: MESSAGE_COST,
            reason: "message".into(),
        };
        handle_deduct_credits(&charge, state.clock.as_ref(), state.events.as_ref()).await?;
    }

    let command = SendMessage {
        correlation_id,
        viewer,
        session_id,
        content: request.content,
        memories,
    };
    match handle_send_message(
        &command,
        state.clock.as_ref(),
        state.generator.as_ref(),
        state.characters.as_ref(),
        state.events.as_ref(),
    )
    .await
    {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            if let Some(user_id) = billed {
                refund_message(&state, user_id, correlation_id).await;
            }
            Err(e.into())
        }
    }
}

#[instrument(skip_all, fields(%session_id))]
async fn advance(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let command = AdvanceBeat {
        correlation_id: correlation_id(),
        viewer,
        session_id,
    };
    let session =
        handle_advance_beat(&command, state.clock.as_ref(), state.events.as_ref()).await?;
    Ok(Json(session))
}

#[instrument(skip_all, fields(%session_id, option_key = %request.option_key))]
async fn choose(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MakeChoiceRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = MakeChoice {
        correlation_id: correlation_id(),
        viewer,
        session_id,
        option_key: request.option_key,
    };
    let session =
        handle_make_choice(&command, state.clock.as_ref(), state.events.as_ref()).await?;
    Ok(Json(session))
}

/// Returns the router for episode sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/episodes", post(start))
        .route("/episodes/{session_id}", get(show))
        .route(
            "/episodes/{session_id}/messages",
            get(transcript).post(send_message),
        )
        .route("/episodes/{session_id}/advance", post(advance))
        .route("/episodes/{session_id}/choice", post(choose))
}
