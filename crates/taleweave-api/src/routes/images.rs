//! Image metadata routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_catalog::application::command_handlers::{
    handle_delete_image, handle_register_image,
};
use taleweave_catalog::application::query_handlers::{ImageView, get_image, list_images};
use taleweave_catalog::domain::commands::{DeleteImage, RegisterImage};
use taleweave_catalog::domain::image::{ImageOwnerKind, NewImage};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    owner_kind: ImageOwnerKind,
    owner_id: Uuid,
}

#[instrument(skip_all, fields(owner_id = %input.owner_id))]
async fn register(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(input): Json<NewImage>,
) -> Result<(StatusCode, Json<ImageView>), ApiError> {
    let command = RegisterImage {
        correlation_id: correlation_id(),
        input,
    };
    let image =
        handle_register_image(&command, state.clock.as_ref(), state.catalog.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ImageView::new(image, &state.settings.asset_base_url)),
    ))
}

#[instrument(skip_all, fields(owner_kind = %query.owner_kind, owner_id = %query.owner_id))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ImageView>>, ApiError> {
    let images = list_images(
        query.owner_kind,
        query.owner_id,
        &state.settings.asset_base_url,
        state.catalog.as_ref(),
    )
    .await?;
    Ok(Json(images))
}

#[instrument(skip_all, fields(%image_id))]
async fn show(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
) -> Result<Json<ImageView>, ApiError> {
    let image = get_image(
        image_id,
        &state.settings.asset_base_url,
        state.catalog.as_ref(),
    )
    .await?;
    Ok(Json(image))
}

#[instrument(skip_all, fields(%image_id))]
async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(image_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = DeleteImage {
        correlation_id: correlation_id(),
        image_id,
    };
    handle_delete_image(&command, state.catalog.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for images.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/images", get(list).post(register))
        .route("/images/{image_id}", get(show).delete(delete))
}
