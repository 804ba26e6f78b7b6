//! Command handlers for the characters context.
//!
//! Ignition runs exactly once per create or regenerate request. A generator
//! failure aborts the command before anything is written.

use taleweave_core::clock::Clock;
use taleweave_core::command::Command;
use taleweave_core::error::DomainError;
use taleweave_core::generation::TextGenerator;
use tracing::info;
use uuid::Uuid;

use crate::domain::character::Character;
use crate::domain::commands::{
    CreateCharacter, DeleteCharacter, RegenerateIgnition, UpdateCharacter,
};
use crate::domain::ignition::{Ignition, build_ignition_request, parse_ignition};
use crate::domain::repository::CharacterRepository;

async fn ignite(
    character: &Character,
    clock: &dyn Clock,
    generator: &dyn TextGenerator,
) -> Result<Ignition, DomainError> {
    let request = build_ignition_request(character);
    let reply = generator.complete(&request).await?;
    parse_ignition(&reply, clock.now())
}

/// Loads a character the actor created. Characters the actor cannot see are
/// reported as missing; visible ones they did not create are forbidden.
async fn load_own(
    character_id: Uuid,
    actor_id: Uuid,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let character = repo
        .find(character_id)
        .await?
        .filter(|c| c.is_visible_to(actor_id))
        .ok_or_else(|| DomainError::not_found("character", character_id))?;
    character.ensure_creator(actor_id)?;
    Ok(character)
}

/// Handles `CreateCharacter`: validates the definition, runs ignition, and
/// stores the character with its ignition in one insert.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a bad definition and
/// `DomainError::Upstream` if ignition fails.
pub async fn handle_create_character(
    command: &CreateCharacter,
    clock: &dyn Clock,
    generator: &dyn TextGenerator,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let mut character = Character::create(
        command.input.clone(),
        Uuid::now_v7(),
        command.creator_id,
        clock.now(),
    )?;
    character.ignition = Some(ignite(&character, clock, generator).await?);
    repo.insert(&character).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        character_id = %character.id,
        "character created"
    );
    Ok(character)
}

/// Handles `RegenerateIgnition`: re-runs ignition and overwrites the stored
/// result.
///
/// # Errors
///
/// Returns `DomainError::NotFound`/`Forbidden` for characters the actor does
/// not own and `DomainError::Upstream` if ignition fails.
pub async fn handle_regenerate_ignition(
    command: &RegenerateIgnition,
    clock: &dyn Clock,
    generator: &dyn TextGenerator,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let mut character = load_own(command.character_id, command.actor_id, repo).await?;
    character.ignition = Some(ignite(&character, clock, generator).await?);
    character.updated_at = clock.now();
    repo.save(&character).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        character_id = %character.id,
        "ignition regenerated"
    );
    Ok(character)
}

/// Handles `UpdateCharacter`. The stored ignition is left as it was.
///
/// # Errors
///
/// Returns `DomainError::NotFound`/`Forbidden` for characters the actor does
/// not own and `DomainError::Validation` for bad fields.
pub async fn handle_update_character(
    command: &UpdateCharacter,
    clock: &dyn Clock,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let mut character = load_own(command.character_id, command.actor_id, repo).await?;
    character.apply_update(command.update.clone(), clock.now())?;
    repo.save(&character).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        character_id = %character.id,
        "character updated"
    );
    Ok(character)
}

/// Handles `DeleteCharacter`.
///
/// # Errors
///
/// Returns `DomainError::NotFound`/`Forbidden` for characters the actor does
/// not own.
pub async fn handle_delete_character(
    command: &DeleteCharacter,
    repo: &dyn CharacterRepository,
) -> Result<(), DomainError> {
    let character = load_own(command.character_id, command.actor_id, repo).await?;
    repo.delete(character.id).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        character_id = %character.id,
        "character deleted"
    );
    Ok(())
}
