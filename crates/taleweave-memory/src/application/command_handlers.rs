//! Command handlers for the memory context.

use std::sync::Arc;

use taleweave_core::clock::Clock;
use taleweave_core::command::Command;
use taleweave_core::error::DomainError;
use taleweave_core::generation::Embedder;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::{Forget, Remember};
use crate::domain::memory::Memory;
use crate::domain::repository::MemoryRepository;

/// A stored memory and the background task computing its embedding.
#[derive(Debug)]
pub struct Remembered {
    /// The memory as written, without its embedding.
    pub memory: Memory,
    /// Completes once the embedding is stored or has failed. Dropping the
    /// handle detaches the task.
    pub embedding: JoinHandle<()>,
}

/// Computes and stores the embedding of `memory_id`. Failures are logged and
/// otherwise ignored; the memory stays recallable by importance.
pub fn spawn_embedding(
    memory_id: Uuid,
    content: String,
    embedder: Arc<dyn Embedder>,
    repo: Arc<dyn MemoryRepository>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let embedding = match embedder.embed(&content).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(%memory_id, error = %e, "memory embedding failed");
                return;
            }
        };
        if let Err(e) = repo.set_embedding(memory_id, &embedding).await {
            warn!(%memory_id, error = %e, "storing memory embedding failed");
        }
    })
}

/// Handles `Remember`: writes the memory, then embeds it in the background.
///
/// # Errors
///
/// Returns `DomainError::Validation` for bad content or importance. Embedding
/// errors never surface here.
pub async fn handle_remember(
    command: &Remember,
    clock: &dyn Clock,
    embedder: Arc<dyn Embedder>,
    repo: Arc<dyn MemoryRepository>,
) -> Result<Remembered, DomainError> {
    let memory = Memory::create(
        command.viewer.owner(),
        command.character_id,
        &command.content,
        command.importance,
        Uuid::now_v7(),
        clock.now(),
    )?;
    repo.insert(&memory).await?;
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        memory_id = %memory.id,
        "memory stored"
    );

    let embedding = spawn_embedding(memory.id, memory.content.clone(), embedder, repo);
    Ok(Remembered { memory, embedding })
}

/// Handles `Forget`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for missing memories and memories owned by
/// someone else.
pub async fn handle_forget(
    command: &Forget,
    repo: &dyn MemoryRepository,
) -> Result<(), DomainError> {
    let memory = repo
        .find(command.memory_id)
        .await?
        .filter(|m| m.owner.is_visible_to(&command.viewer))
        .ok_or_else(|| DomainError::not_found("memory", command.memory_id))?;
    repo.delete(memory.id).await?;
    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id,
        memory_id = %memory.id,
        "memory forgotten"
    );
    Ok(())
}
