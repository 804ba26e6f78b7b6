//! Query handlers for the memory context.

use serde::Serialize;
use taleweave_core::error::DomainError;
use taleweave_core::generation::Embedder;
use taleweave_core::identity::Viewer;
use tracing::warn;
use uuid::Uuid;

use crate::domain::memory::Memory;
use crate::domain::ranking::rank;
use crate::domain::repository::MemoryRepository;

/// Memories returned when the caller does not say.
pub const DEFAULT_RECALL_LIMIT: usize = 10;

/// Most memories returned by one recall.
pub const MAX_RECALL_LIMIT: usize = 50;

/// A recalled memory.
#[derive(Debug, Clone, Serialize)]
pub struct RecalledMemory {
    /// The memory.
    #[serde(flatten)]
    pub memory: Memory,
    /// Similarity to the query, when ranked by one.
    pub score: Option<f32>,
}

/// Recalls the viewer's memories about a character, most relevant first.
///
/// With a non-blank `query`, the query is embedded and memories are ranked by
/// similarity. If embedding the query fails the recall falls back to
/// importance and recency.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn recall(
    viewer: &Viewer,
    character_id: Uuid,
    query: Option<&str>,
    limit: Option<usize>,
    embedder: &dyn Embedder,
    repo: &dyn MemoryRepository,
) -> Result<Vec<RecalledMemory>, DomainError> {
    let limit = limit
        .unwrap_or(DEFAULT_RECALL_LIMIT)
        .clamp(1, MAX_RECALL_LIMIT);
    let memories = repo.list_for(&viewer.owner(), character_id).await?;
    if memories.is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) if memories.iter().any(Memory::is_embedded) => match embedder.embed(q).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(%character_id, error = %e, "query embedding failed; ranking by importance");
                None
            }
        },
        _ => None,
    };

    Ok(rank(memories, query_embedding.as_deref(), limit)
        .into_iter()
        .map(|r| RecalledMemory {
            memory: r.memory,
            score: r.score,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use taleweave_core::identity::Owner;
    use taleweave_test_support::{FailingEmbedder, StubEmbedder, fixed_now};

    use super::*;
    use crate::in_memory::InMemoryMemoryRepository;

    async fn seed(
        repo: &InMemoryMemoryRepository,
        owner: Owner,
        character_id: Uuid,
        content: &str,
        importance: i16,
        embed: bool,
    ) {
        let mut memory = Memory::create(
            owner,
            character_id,
            content,
            Some(importance),
            Uuid::new_v4(),
            fixed_now(),
        )
        .unwrap();
        if embed {
            memory.embedding = Some(StubEmbedder.embed(content).await.unwrap());
        }
        repo.insert(&memory).await.unwrap();
    }

    #[tokio::test]
    async fn test_recall_ranks_by_similarity_to_query() {
        // Arrange
        let repo = InMemoryMemoryRepository::new();
        let viewer = Viewer::member(Uuid::new_v4(), "m@example.com").unwrap();
        let character = Uuid::new_v4();
        seed(&repo, viewer.owner(), character, "zzz quiet nights", 9, true).await;
        seed(&repo, viewer.owner(), character, "loves apples and bananas", 2, true).await;

        // Act
        let recalled = recall(&viewer, character, Some("bananas"), None, &StubEmbedder, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(recalled[0].memory.content, "loves apples and bananas");
        assert!(recalled[0].score.is_some());
    }

    #[tokio::test]
    async fn test_recall_falls_back_to_importance_when_embedding_fails() {
        let repo = InMemoryMemoryRepository::new();
        let viewer = Viewer::guest("tab").unwrap();
        let character = Uuid::new_v4();
        seed(&repo, viewer.owner(), character, "minor", 2, true).await;
        seed(&repo, viewer.owner(), character, "major", 9, true).await;

        let recalled = recall(&viewer, character, Some("anything"), Some(1), &FailingEmbedder, &repo)
            .await
            .unwrap();

        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled[0].memory.content, "major");
        assert!(recalled[0].score.is_none());
    }

    #[tokio::test]
    async fn test_recall_is_scoped_to_guest_session() {
        let repo = InMemoryMemoryRepository::new();
        let mine = Viewer::guest("tab-a").unwrap();
        let theirs = Viewer::guest("tab-b").unwrap();
        let character = Uuid::new_v4();
        seed(&repo, theirs.owner(), character, "their secret", 5, false).await;

        let recalled = recall(&mine, character, None, None, &StubEmbedder, &repo)
            .await
            .unwrap();

        assert!(recalled.is_empty());
    }
}
