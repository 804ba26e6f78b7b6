//! Catalog and character search.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use taleweave_catalog::application::query_handlers::{SEARCH_LIMIT, normalize_query, search};
use taleweave_catalog::domain::series::Series;
use taleweave_catalog::domain::world::World;
use taleweave_characters::application::query_handlers::search_characters;
use taleweave_characters::domain::character::Character;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Matches for one query, grouped by record kind.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    /// Active worlds.
    pub worlds: Vec<World>,
    /// Published series.
    pub series: Vec<Series>,
    /// Public characters.
    pub characters: Vec<Character>,
}

#[instrument(skip_all, fields(q = %query.q))]
async fn search_all(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, ApiError> {
    let q = normalize_query(&query.q)?;
    let catalog = search(q, state.catalog.as_ref()).await?;
    let characters = search_characters(q, SEARCH_LIMIT, state.characters.as_ref()).await?;
    Ok(Json(SearchResults {
        worlds: catalog.worlds,
        series: catalog.series,
        characters,
    }))
}

/// Returns the router for `/search`.
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search_all))
}
