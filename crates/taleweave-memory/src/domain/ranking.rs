//! Recall ranking.

use std::cmp::Ordering;

use super::memory::Memory;

/// Cosine similarity of two vectors. Mismatched lengths, zero vectors and
/// non-finite components score 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f32, 0.0_f32, 0.0_f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() { score } else { 0.0 }
}

fn by_importance_then_recency(a: &Memory, b: &Memory) -> Ordering {
    b.importance
        .cmp(&a.importance)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// A memory with its similarity to the query, when one was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// The memory.
    pub memory: Memory,
    /// Cosine similarity to the query.
    pub score: Option<f32>,
}

/// Orders memories for recall and keeps the first `limit`.
///
/// With a query embedding, embedded memories come first by similarity (ties
/// by importance, then recency) and the rest follow by importance, then
/// recency. Without one, everything is ordered by importance, then recency.
#[must_use]
pub fn rank(memories: Vec<Memory>, query: Option<&[f32]>, limit: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = memories
        .into_iter()
        .map(|memory| {
            let score = query.and_then(|q| {
                memory
                    .embedding
                    .as_deref()
                    .map(|e| cosine_similarity(q, e))
            });
            Ranked { memory, score }
        })
        .collect();

    ranked.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y
            .total_cmp(&x)
            .then_with(|| by_importance_then_recency(&a.memory, &b.memory)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_importance_then_recency(&a.memory, &b.memory),
    });
    ranked.truncate(limit);
    ranked
}
