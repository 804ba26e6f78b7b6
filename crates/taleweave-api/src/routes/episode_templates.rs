//! Episode template and game routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use taleweave_catalog::application::command_handlers::{
    handle_create_episode_template, handle_publish_episode_template,
};
use taleweave_catalog::application::query_handlers::{get_episode, list_games};
use taleweave_catalog::domain::commands::{CreateEpisodeTemplate, PublishEpisodeTemplate};
use taleweave_catalog::domain::episode::{EpisodeTemplate, NewEpisodeTemplate};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{AdminUser, MaybeViewer};
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[instrument(skip_all, fields(series_id = %input.series_id, number = input.episode_number))]
async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<NewEpisodeTemplate>,
) -> Result<(StatusCode, Json<EpisodeTemplate>), ApiError> {
    let command = CreateEpisodeTemplate {
        correlation_id: correlation_id(),
        input,
    };
    let episode =
        handle_create_episode_template(&command, state.clock.as_ref(), state.catalog.as_ref())
            .await?;
    Ok((StatusCode::CREATED, Json(episode)))
}

#[instrument(skip_all, fields(%episode_id))]
async fn show(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Path(episode_id): Path<Uuid>,
) -> Result<Json<EpisodeTemplate>, ApiError> {
    let episode = get_episode(episode_id, viewer.is_admin(&state), state.catalog.as_ref()).await?;
    Ok(Json(episode))
}

#[instrument(skip_all, fields(%episode_id))]
async fn publish(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(episode_id): Path<Uuid>,
) -> Result<Json<EpisodeTemplate>, ApiError> {
    let command = PublishEpisodeTemplate {
        correlation_id: correlation_id(),
        episode_id,
    };
    Ok(Json(
        handle_publish_episode_template(&command, state.catalog.as_ref()).await?,
    ))
}

async fn games(State(state): State<AppState>) -> Result<Json<Vec<EpisodeTemplate>>, ApiError> {
    Ok(Json(list_games(state.catalog.as_ref()).await?))
}

/// Returns the router for episode templates and games.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/episode-templates", post(create))
        .route("/episode-templates/{episode_id}", get(show))
        .route("/episode-templates/{episode_id}/publish", post(publish))
        .route("/games", get(games))
}
