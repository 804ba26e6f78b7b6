//! Route modules, one per resource group.

pub mod admin;
pub mod characters;
pub mod credits;
pub mod episode_templates;
pub mod episodes;
pub mod health;
pub mod images;
pub mod memory;
pub mod search;
pub mod series;
pub mod users;
pub mod worlds;

use axum::Router;
use uuid::Uuid;

use crate::state::AppState;

/// Correlation id for a command issued by this request.
pub(crate) fn correlation_id() -> Uuid {
    Uuid::new_v4()
}

/// Everything served under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(worlds::router())
        .merge(series::router())
        .merge(episode_templates::router())
        .merge(images::router())
        .merge(characters::router())
        .merge(episodes::router())
        .merge(memory::router())
        .merge(credits::router())
        .merge(admin::router())
        .merge(search::router())
}
