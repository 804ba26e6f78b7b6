//! Series routes. Unpublished series are only visible to admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use taleweave_catalog::application::command_handlers::{
    handle_create_series, handle_publish_series, handle_update_series,
};
use taleweave_catalog::application::query_handlers::{get_series, list_episodes, list_series};
use taleweave_catalog::domain::commands::{CreateSeries, PublishSeries, UpdateSeries};
use taleweave_catalog::domain::episode::EpisodeTemplate;
use taleweave_catalog::domain::series::{NewSeries, Series, SeriesFilter, SeriesUpdate};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{AdminUser, MaybeViewer};
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[instrument(skip_all)]
async fn list(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Query(mut filter): Query<SeriesFilter>,
) -> Result<Json<Vec<Series>>, ApiError> {
    filter.include_unpublished = filter.include_unpublished && viewer.is_admin(&state);
    Ok(Json(list_series(&filter, state.catalog.as_ref()).await?))
}

#[instrument(skip_all, fields(title = %input.title))]
async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<NewSeries>,
) -> Result<(StatusCode, Json<Series>), ApiError> {
    let command = CreateSeries {
        correlation_id: correlation_id(),
        input,
    };
    let series =
        handle_create_series(&command, state.clock.as_ref(), state.catalog.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(series)))
}

#[instrument(skip_all, fields(%series_id))]
async fn show(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Path(series_id): Path<Uuid>,
) -> Result<Json<Series>, ApiError> {
    let series = get_series(series_id, viewer.is_admin(&state), state.catalog.as_ref()).await?;
    Ok(Json(series))
}

#[instrument(skip_all, fields(%series_id))]
async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(series_id): Path<Uuid>,
    Json(update): Json<SeriesUpdate>,
) -> Result<Json<Series>, ApiError> {
    let command = UpdateSeries {
        correlation_id: correlation_id(),
        series_id,
        update,
    };
    Ok(Json(handle_update_series(&command, state.catalog.as_ref()).await?))
}

#[instrument(skip_all, fields(%series_id))]
async fn publish(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(series_id): Path<Uuid>,
) -> Result<Json<Series>, ApiError> {
    let command = PublishSeries {
        correlation_id: correlation_id(),
        series_id,
    };
    Ok(Json(handle_publish_series(&command, state.catalog.as_ref()).await?))
}

#[instrument(skip_all, fields(%series_id))]
async fn episodes(
    State(state): State<AppState>,
    viewer: MaybeViewer,
    Path(series_id): Path<Uuid>,
) -> Result<Json<Vec<EpisodeTemplate>>, ApiError> {
    let episodes =
        list_episodes(series_id, viewer.is_admin(&state), state.catalog.as_ref()).await?;
    Ok(Json(episodes))
}

/// Returns the router for series.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/series", get(list).post(create))
        .route("/series/{series_id}", get(show).patch(update))
        .route("/series/{series_id}/publish", post(publish))
        .route("/series/{series_id}/episodes", get(episodes))
}
