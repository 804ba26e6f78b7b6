//! Credit balance and admin grants.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_credits::application::command_handlers::handle_grant_credits;
use taleweave_credits::application::query_handlers::{BalanceView, get_balance};
use taleweave_credits::domain::commands::GrantCredits;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{AdminUser, MemberUser};
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

/// Body of `POST /credits/grant`.
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    /// Member receiving the credits.
    pub user_id: Uuid,
    /// Number of credits.
    pub amount: i64,
    /// Ledger reason; defaults to `"admin grant"`.
    pub reason: Option<String>,
}

#[instrument(skip_all, fields(user_id = %member.user_id))]
async fn balance(
    State(state): State<AppState>,
    member: MemberUser,
) -> Result<Json<BalanceView>, ApiError> {
    Ok(Json(get_balance(member.user_id, state.events.as_ref()).await?))
}

#[instrument(skip_all, fields(user_id = %request.user_id, amount = request.amount, admin = %admin.0.email))]
async fn grant(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<GrantRequest>,
) -> Result<Json<BalanceView>, ApiError> {
    let command = GrantCredits {
        correlation_id: correlation_id(),
        user_id: request.user_id,
        amount: request.amount,
        reason: request.reason.unwrap_or_else(|| "admin grant".into()),
    };
    handle_grant_credits(&command, state.clock.as_ref(), state.events.as_ref()).await?;
    Ok(Json(get_balance(request.user_id, state.events.as_ref()).await?))
}

/// Returns the router for credits.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credits", get(balance))
        .route("/credits/grant", post(grant))
}
