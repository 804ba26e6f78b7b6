//! Memory routes. Memories are scoped to the viewer, guests included.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_memory::application::command_handlers::{handle_forget, handle_remember};
use taleweave_memory::application::query_handlers::{RecalledMemory, recall};
use taleweave_memory::domain::commands::{Forget, Remember};
use taleweave_memory::domain::memory::Memory;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::CurrentViewer;
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RecallQuery {
    character_id: Uuid,
    q: Option<String>,
    limit: Option<usize>,
}

/// Body of `POST /memory`.
#[derive(Debug, Deserialize)]
pub struct RememberRequest {
    /// The character that remembers.
    pub character_id: Uuid,
    /// What to remember.
    pub content: String,
    /// 1..=10.
    pub importance: Option<i16>,
}

#[instrument(skip_all, fields(character_id = %query.character_id))]
async fn list(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<RecallQuery>,
) -> Result<Json<Vec<RecalledMemory>>, ApiError> {
    let recalled = recall(
        &viewer,
        query.character_id,
        query.q.as_deref(),
        query.limit,
        state.embedder.as_ref(),
        state.memories.as_ref(),
    )
    .await?;
    Ok(Json(recalled))
}

#[instrument(skip_all, fields(character_id = %request.character_id))]
async fn remember(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Json(request): Json<RememberRequest>,
) -> Result<(StatusCode, Json<Memory>), ApiError> {
    let command = Remember {
        correlation_id: correlation_id(),
        viewer,
        character_id: request.character_id,
        content: request.content,
        importance: request.importance,
    };
    // The embedding task runs detached; the response does not wait for it.
    let remembered = handle_remember(
        &command,
        state.clock.as_ref(),
        state.embedder.clone(),
        state.memories.clone(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(remembered.memory)))
}

#[instrument(skip_all, fields(%memory_id))]
async fn forget(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(memory_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = Forget {
        correlation_id: correlation_id(),
        viewer,
        memory_id,
    };
    handle_forget(&command, state.memories.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for memories.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/memory", get(list).post(remember))
        .route("/memory/{memory_id}", delete(forget))
}
