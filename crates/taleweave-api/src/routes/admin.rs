//! Admin-only platform routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_accounts::application::query_handlers::{get_platform_stats, list_users};
use taleweave_accounts::domain::profile::{PlatformStats, UserProfile};
use taleweave_catalog::application::command_handlers::{
    ImportOutcome, handle_import_content_pack,
};
use taleweave_catalog::domain::commands::ImportContentPack;
use tracing::instrument;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[instrument(skip_all)]
async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<PlatformStats>, ApiError> {
    Ok(Json(
        get_platform_stats(state.clock.as_ref(), state.stats.as_ref()).await?,
    ))
}

#[instrument(skip_all, fields(limit = ?page.limit, offset = ?page.offset))]
async fn users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(
        list_users(page.limit, page.offset, state.users.as_ref()).await?,
    ))
}

/// Imports a YAML content pack sent as the raw request body. Answers 201
/// when something new was written and 200 for an already imported version.
#[instrument(skip_all, fields(bytes = document.len()))]
async fn import_content_pack(
    State(state): State<AppState>,
    _admin: AdminUser,
    document: String,
) -> Result<(StatusCode, Json<ImportOutcome>), ApiError> {
    let command = ImportContentPack {
        correlation_id: correlation_id(),
        document,
    };
    let outcome =
        handle_import_content_pack(&command, state.clock.as_ref(), state.catalog.as_ref())
            .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Returns the router for `/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/users", get(users))
        .route("/admin/content-packs", post(import_content_pack))
}
