//! Character routes. Mutations are limited to the character's creator.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweave_characters::application::command_handlers::{
    handle_create_character, handle_delete_character, handle_regenerate_ignition,
    handle_update_character,
};
use taleweave_characters::application::query_handlers::{get_character, list_characters};
use taleweave_characters::domain::character::{Character, CharacterUpdate, NewCharacter};
use taleweave_characters::domain::commands::{
    CreateCharacter, DeleteCharacter, RegenerateIgnition, UpdateCharacter,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{CurrentViewer, MemberUser};
use crate::error::ApiError;
use crate::routes::correlation_id;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct ListCharactersQuery {
    #[serde(default)]
    mine: bool,
}

#[instrument(skip_all, fields(mine = query.mine))]
async fn list(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<ListCharactersQuery>,
) -> Result<Json<Vec<Character>>, ApiError> {
    let characters = list_characters(&viewer, query.mine, state.characters.as_ref()).await?;
    Ok(Json(characters))
}

#[instrument(skip_all, fields(user_id = %member.user_id, name = %input.name))]
async fn create(
    State(state): State<AppState>,
    member: MemberUser,
    Json(input): Json<NewCharacter>,
) -> Result<(StatusCode, Json<Character>), ApiError> {
    let command = CreateCharacter {
        correlation_id: correlation_id(),
        creator_id: member.user_id,
        input,
    };
    let character = handle_create_character(
        &command,
        state.clock.as_ref(),
        state.generator.as_ref(),
        state.characters.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(character)))
}

#[instrument(skip_all, fields(%character_id))]
async fn show(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Character>, ApiError> {
    let character = get_character(character_id, &viewer, state.characters.as_ref()).await?;
    Ok(Json(character))
}

#[instrument(skip_all, fields(%character_id, user_id = %member.user_id))]
async fn update(
    State(state): State<AppState>,
    member: MemberUser,
    Path(character_id): Path<Uuid>,
    Json(update): Json<CharacterUpdate>,
) -> Result<Json<Character>, ApiError> {
    let command = UpdateCharacter {
        correlation_id: correlation_id(),
        actor_id: member.user_id,
        character_id,
        update,
    };
    let character =
        handle_update_character(&command, state.clock.as_ref(), state.characters.as_ref())
            .await?;
    Ok(Json(character))
}

#[instrument(skip_all, fields(%character_id, user_id = %member.user_id))]
async fn delete(
    State(state): State<AppState>,
    member: MemberUser,
    Path(character_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = DeleteCharacter {
        correlation_id: correlation_id(),
        actor_id: member.user_id,
        character_id,
    };
    handle_delete_character(&command, state.characters.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(%character_id, user_id = %member.user_id))]
async fn regenerate_ignition(
    State(state): State<AppState>,
    member: MemberUser,
    Path(character_id): Path<Uuid>,
) -> Result<Json<Character>, ApiError> {
    let command = RegenerateIgnition {
        correlation_id: correlation_id(),
        actor_id: member.user_id,
        character_id,
    };
    let character = handle_regenerate_ignition(
        &command,
        state.clock.as_ref(),
        state.generator.as_ref(),
        state.characters.as_ref(),
    )
    .await?;
    Ok(Json(character))
}

/// Returns the router for characters.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters", get(list).post(create))
        .route(
            "/characters/{character_id}",
            get(show).patch(update).delete(delete),
        )
        .route(
            "/characters/{character_id}/ignition",
            post(regenerate_ignition),
        )
}
