//! World routes. Inactive worlds are only visible to admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_catalog::application::command_handlers::{handle_create_world, handle_update_world};
use taleweave_catalog::application::query_handlers::{get_world, get_world_by_slug, list_worlds};
use taleweave_catalog::domain::commands::{CreateWorld, UpdateWorld};
use taleweave_catalog::domain::world::{NewWorld, World, WorldUpdate};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{AdminUser, MaybeViewer};
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct ListWorldsQuery {
    #[serde(default)]
    include_inactive: bool,
}

#[instrument(skip_all)]
async fn list(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Query(query): Query<ListWorldsQuery>,
) -> Result<Json<Vec<World>>, ApiError> {
    let include_inactive = query.include_inactive && viewer.is_admin(&state);
    Ok(Json(list_worlds(include_inactive, state.catalog.as_ref()).await?))
}

#[instrument(skip_all, fields(name = %input.name))]
async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<NewWorld>,
) -> Result<(StatusCode, Json<World>), ApiError> {
    let command = CreateWorld {
        correlation_id: correlation_id(),
        input,
    };
    let world = handle_create_world(&command, state.clock.as_ref(), state.catalog.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(world)))
}

#[instrument(skip_all, fields(%world_id))]
async fn show(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Path(world_id): Path<Uuid>,
) -> Result<Json<World>, ApiError> {
    let world = get_world(world_id, viewer.is_admin(&state), state.catalog.as_ref()).await?;
    Ok(Json(world))
}

#[instrument(skip_all, fields(%slug))]
async fn show_by_slug(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Path(slug): Path<String>,
) -> Result<Json<World>, ApiError> {
    let world = get_world_by_slug(&slug, viewer.is_admin(&state), state.catalog.as_ref()).await?;
    Ok(Json(world))
}

#[instrument(skip_all, fields(%world_id))]
async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(world_id): Path<Uuid>,
    Json(update): Json<WorldUpdate>,
) -> Result<Json<World>, ApiError> {
    let command = UpdateWorld {
        correlation_id: correlation_id(),
        world_id,
        update,
    };
    Ok(Json(handle_update_world(&command, state.catalog.as_ref()).await?))
}

/// Returns the router for worlds.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/worlds", get(list).post(create))
        .route("/worlds/{world_id}", get(show).patch(update))
        .route("/worlds/slug/{slug}", get(show_by_slug))
}
