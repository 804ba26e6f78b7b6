//! Query handlers for the characters context.

use taleweave_core::error::DomainError;
use taleweave_core::identity::Viewer;
use uuid::Uuid;

use crate::domain::character::Character;
use crate::domain::repository::CharacterRepository;

/// Looks up a character the viewer may see.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist or is
/// private to someone else.
pub async fn get_character(
    character_id: Uuid,
    viewer: &Viewer,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    repo.find(character_id)
        .await?
        .filter(|c| c.is_visible_to(viewer.user_id()))
        .ok_or_else(|| DomainError::not_found("character", character_id))
}

/// Lists characters for a viewer: with `only_mine`, the member's own
/// characters; otherwise every public character plus the member's own.
///
/// # Errors
///
/// Returns `DomainError::Unauthorized` when a guest asks for `only_mine`.
pub async fn list_characters(
    viewer: &Viewer,
    only_mine: bool,
    repo: &dyn CharacterRepository,
) -> Result<Vec<Character>, DomainError> {
    if only_mine {
        return repo.list_by_creator(viewer.require_member()?).await;
    }
    let creator = (!viewer.is_guest()).then(|| viewer.user_id());
    repo.list_visible(creator).await
}

/// Searches public characters by name.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn search_characters(
    query: &str,
    limit: usize,
    repo: &dyn CharacterRepository,
) -> Result<Vec<Character>, DomainError> {
    repo.search_public(query, limit).await
}
