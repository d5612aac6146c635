//! Vector index: storage and nearest-neighbor search over embedded chunks.
//!
//! This module provides the [`VectorIndex`] trait that abstracts over index
//! implementations, so pipeline code can work against any backing store
//! without being tied to one.
//!
//! # Architecture
//!
//! ```text
//!                  ┌────────────────────┐
//!                  │  VectorIndex Trait │
//!                  │    (async API)     │
//!                  └─────────┬──────────┘
//!                            │
//!                 ┌──────────┴──────────┐
//!                 │                     │
//!                 ▼                     ▼
//!          ┌──────────────┐     ┌──────────────┐
//!          │ InMemoryIndex│     │   (future)   │
//!          │ cosine, RAM  │     │  sqlite-vec  │
//!          └──────────────┘     └──────────────┘
//! ```
//!
//! # Similarity metric
//!
//! All implementations rank by **cosine distance** (`1 - cosine similarity`):
//! `0.0` means identical direction, `1.0` orthogonal, `2.0` opposite. Lower
//! is more similar, and query results are ascending by distance.
//!
//! # Dimensionality
//!
//! An empty index has no dimensionality; the first insert establishes it
//! from its vectors and every later insert must match, or the whole batch is
//! rejected with `DimensionMismatch`. A [`VectorIndex::reset`] clears the
//! entries *and* the established dimensionality — that is the supported
//! remedy when the embedding model changes.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::EngineError;

pub use memory::InMemoryIndex;

/// Metadata persisted alongside every index entry.
///
/// Carries the attribution fields the conversational layer needs: which
/// document a snippet came from and where in that document it sat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Identifier of the originating document (e.g. a filename).
    pub source_document: String,
    /// Zero-based position within the document's chunk sequence.
    pub sequence_index: usize,
}

impl ChunkMetadata {
    /// Metadata for one chunk of one document.
    #[must_use]
    pub fn new(source_document: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            source_document: source_document.into(),
            sequence_index,
        }
    }
}

/// The persisted unit inside the vector index.
///
/// Entries are immutable once inserted; there is no partial delete or
/// update, only a full [`VectorIndex::reset`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Globally unique id, unique even across re-ingestions of a
    /// same-named document.
    pub id: String,
    /// The embedding. Length must equal the index dimensionality.
    pub vector: Vec<f32>,
    /// The chunk text, kept alongside the vector so retrieval can return
    /// content without a second fetch.
    pub text: String,
    /// Attribution metadata.
    pub metadata: ChunkMetadata,
}

impl IndexEntry {
    /// Build an entry from its parts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        vector: Vec<f32>,
        text: impl Into<String>,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            vector,
            text: text.into(),
            metadata,
        }
    }
}

/// One ranked answer to a similarity query. Transient: produced per query,
/// consumed immediately, never cached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievalResult {
    /// The stored chunk text.
    pub text: String,
    /// Attribution metadata of the stored chunk.
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query vector; lower is more similar.
    pub distance: f32,
}

/// Point-in-time counters describing an index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of stored entries.
    pub entries: usize,
    /// Established dimensionality, `None` while the index is empty.
    pub dimension: Option<usize>,
    /// Number of distinct source documents across all entries.
    pub source_documents: usize,
}

/// Unified interface for vector index backends.
///
/// # Concurrency contract
///
/// Inserts and queries may interleave freely. Mutations (insert, reset) are
/// serialized against each other and against queries: a reader observes
/// either the pre-insert or the post-insert state, never a partially
/// applied batch.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a batch of entries atomically and return their ids.
    ///
    /// The whole batch is validated before anything is stored: a
    /// `DimensionMismatch` or `InvalidArgument` (empty or non-finite
    /// vector) rejects the batch without mutating the index.
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<Vec<String>, EngineError>;

    /// The `k` nearest neighbors of `vector`, ascending by cosine distance.
    ///
    /// An empty index yields an empty result, not an error. `k == 0` is
    /// rejected with `InvalidArgument`. Ties in distance break by entry id
    /// so results are deterministic.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>, EngineError>;

    /// Current number of entries.
    async fn count(&self) -> Result<usize, EngineError>;

    /// Drop every entry and forget the established dimensionality.
    async fn reset(&self) -> Result<(), EngineError>;

    /// Counters for debugging/ops surfaces.
    async fn stats(&self) -> Result<IndexStats, EngineError>;
}

/// Cosine similarity of two vectors, accumulated in `f64` for stability.
///
/// `None` when the lengths differ, either vector is empty, or either norm
/// underflows (a zero vector has no direction to compare).
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}

/// Cosine distance (`1 - cosine similarity`), conceptually in `[0, 2]`.
///
/// `None` whenever the similarity is undefined; callers skip such pairs
/// instead of ranking them with a fabricated distance.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    cosine_similarity(a, b).map(|sim| (1.0 - sim) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_direction_has_zero_distance() {
        let d = cosine_distance(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!(d.abs() < 1e-6, "expected ~0.0, got {d}");
    }

    #[test]
    fn orthogonal_vectors_are_distance_one() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-6, "expected ~1.0, got {d}");
    }

    #[test]
    fn opposite_vectors_are_distance_two() {
        let d = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((d - 2.0).abs() < 1e-6, "expected ~2.0, got {d}");
    }

    #[test]
    fn mismatched_or_degenerate_vectors_have_no_distance() {
        assert!(cosine_distance(&[1.0, 2.0], &[1.0]).is_none());
        assert!(cosine_distance(&[], &[]).is_none());
        assert!(cosine_distance(&[0.0, 0.0], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let meta = ChunkMetadata::new("report.txt", 3);
        let json = serde_json::to_string(&meta).unwrap();
        let back: ChunkMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
        assert!(json.contains("source_document"));
    }
}
