//! The member's own profile.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use taleweave_accounts::application::command_handlers::{EnsuredProfile, handle_ensure_profile};
use taleweave_credits::application::command_handlers::handle_grant_signup_credits;
use taleweave_credits::domain::commands::GrantSignupCredits;
use tracing::{error, info, instrument};

use crate::auth::MemberUser;
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

/// Ensures the member has a profile and that the signup credits have been
/// paid. A failed grant is logged and does not fail the request; the next
/// call tries again.
#[instrument(skip_all, fields(user_id = %member.user_id))]
async fn me(
    State(state): State<AppState>,
    member: MemberUser,
) -> Result<Json<EnsuredProfile>, ApiError> {
    let ensured = handle_ensure_profile(
        member.user_id,
        &member.email,
        state.clock.as_ref(),
        state.users.as_ref(),
    )
    .await?;

    let amount = state.settings.signup_grant;
    if amount > 0 {
        let command = GrantSignupCredits {
            correlation_id: correlation_id(),
            user_id: member.user_id,
            amount,
        };
        match handle_grant_signup_credits(&command, state.clock.as_ref(), state.events.as_ref())
            .await
        {
            Ok(Some(_)) => info!(user_id = %member.user_id, amount, "signup credits granted"),
            Ok(None) => {}
            Err(e) => error!(user_id = %member.user_id, error = %e, "signup grant failed"),
        }
    }
    Ok(Json(ensured))
}

/// Returns the router for `/users`.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/me", get(me))
}
