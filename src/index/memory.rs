//! In-memory vector index with brute-force cosine search.
//!
//! The default backend for the single-process engine: entries live in a
//! `Vec` behind a `parking_lot::RwLock`. Mutations take the write lock and
//! apply a whole batch or nothing; queries take the read lock and scan a
//! stable snapshot. No lock is ever held across an await point, so the
//! async trait surface stays honest about its suspension points.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{IndexEntry, IndexStats, RetrievalResult, VectorIndex, cosine_distance};
use crate::types::EngineError;

#[derive(Debug, Default)]
struct IndexState {
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

/// In-memory [`VectorIndex`].
///
/// Dimensionality is established by the first inserted batch and enforced
/// on every later one; [`VectorIndex::reset`] forgets it along with the
/// entries. Search is an exact linear scan — appropriate for the corpus
/// sizes a local assistant holds, and the trait seam is where an
/// approximate/persistent backend would slot in.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    state: RwLock<IndexState>,
}

impl InMemoryIndex {
    /// Fresh empty index with no established dimensionality.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject vectors no metric can be computed against.
fn validate_vector(vector: &[f32]) -> Result<(), EngineError> {
    if vector.is_empty() {
        return Err(EngineError::InvalidArgument(
            "vector must not be empty".into(),
        ));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::InvalidArgument(
            "vector contains non-finite values".into(),
        ));
    }
    Ok(())
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<Vec<String>, EngineError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.write();
        let expected = state.dimension.unwrap_or(entries[0].vector.len());

        // Validate the whole batch before touching the state so a rejected
        // insert leaves no partial document behind.
        for entry in &entries {
            validate_vector(&entry.vector)?;
            if entry.vector.len() != expected {
                return Err(EngineError::DimensionMismatch {
                    expected,
                    actual: entry.vector.len(),
                });
            }
        }

        state.dimension = Some(expected);
        let ids = entries.iter().map(|entry| entry.id.clone()).collect();
        state.entries.extend(entries);
        Ok(ids)
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>, EngineError> {
        if k == 0 {
            return Err(EngineError::InvalidArgument(
                "k must be greater than zero".into(),
            ));
        }
        validate_vector(vector)?;

        let state = self.state.read();
        if state.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = state.dimension {
            if vector.len() != expected {
                return Err(EngineError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let mut hits: Vec<(f32, &IndexEntry)> = Vec::with_capacity(state.entries.len());
        for entry in &state.entries {
            // Zero-norm entries have no direction to compare; skip them
            // rather than rank them with a fabricated distance.
            let Some(distance) = cosine_distance(vector, &entry.vector) else {
                continue;
            };
            hits.push((distance, entry));
        }
        hits.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        hits.truncate(k);

        Ok(hits
            .into_iter()
            .map(|(distance, entry)| RetrievalResult {
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                distance,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, EngineError> {
        Ok(self.state.read().entries.len())
    }

    async fn reset(&self) -> Result<(), EngineError> {
        let mut state = self.state.write();
        state.entries.clear();
        state.dimension = None;
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats, EngineError> {
        let state = self.state.read();
        let sources: HashSet<&str> = state
            .entries
            .iter()
            .map(|entry| entry.metadata.source_document.as_str())
            .collect();
        Ok(IndexStats {
            entries: state.entries.len(),
            dimension: state.dimension,
            source_documents: sources.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkMetadata;

    fn entry(id: &str, vector: Vec<f32>, source: &str, seq: usize) -> IndexEntry {
        IndexEntry::new(
            id,
            vector,
            format!("text of {id}"),
            ChunkMetadata::new(source, seq),
        )
    }

    #[tokio::test]
    async fn first_insert_establishes_dimensionality() {
        let index = InMemoryIndex::new();
        assert_eq!(index.stats().await.unwrap().dimension, None);

        index
            .insert(vec![entry("a_0", vec![1.0, 0.0, 0.0], "a", 0)])
            .await
            .unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.dimension, Some(3));
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn mismatched_insert_is_rejected_without_mutation() {
        let index = InMemoryIndex::new();
        index
            .insert(vec![entry("a_0", vec![1.0, 0.0, 0.0], "a", 0)])
            .await
            .unwrap();

        let err = index
            .insert(vec![
                entry("b_0", vec![1.0, 0.0, 0.0], "b", 0),
                entry("b_1", vec![1.0, 0.0], "b", 1),
            ])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        // The valid half of the batch must not have been inserted.
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mixed_dimension_first_batch_leaves_index_unestablished() {
        let index = InMemoryIndex::new();
        let err = index
            .insert(vec![
                entry("a_0", vec![1.0, 0.0], "a", 0),
                entry("a_1", vec![1.0, 0.0, 0.0], "a", 1),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch { .. }));

        // Nothing was stored, so a later batch is free to pick a different
        // dimensionality.
        index
            .insert(vec![entry("b_0", vec![0.0, 1.0, 0.0, 0.0], "b", 0)])
            .await
            .unwrap();
        assert_eq!(index.stats().await.unwrap().dimension, Some(4));
    }

    #[tokio::test]
    async fn query_on_empty_index_returns_empty() {
        let index = InMemoryIndex::new();
        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn zero_k_is_invalid() {
        let index = InMemoryIndex::new();
        let err = index.query(&[1.0, 0.0], 0).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn malformed_vectors_are_invalid() {
        let index = InMemoryIndex::new();
        assert!(matches!(
            index.query(&[], 3).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
        assert!(matches!(
            index.query(&[f32::NAN, 1.0], 3).await.unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
        assert!(matches!(
            index
                .insert(vec![entry("a_0", vec![1.0, f32::INFINITY], "a", 0)])
                .await
                .unwrap_err(),
            EngineError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn query_orders_ascending_and_respects_k() {
        let index = InMemoryIndex::new();
        index
            .insert(vec![
                entry("far_0", vec![-1.0, 0.0], "far", 0),
                entry("near_0", vec![1.0, 0.05], "near", 0),
                entry("mid_0", vec![1.0, 1.0], "mid", 0),
            ])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata.source_document, "near");
        assert_eq!(hits[1].metadata.source_document, "mid");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn equal_distances_break_ties_by_id() {
        let index = InMemoryIndex::new();
        // Same direction, different magnitude: identical cosine distance.
        index
            .insert(vec![
                entry("b_0", vec![2.0, 0.0], "b", 0),
                entry("a_0", vec![1.0, 0.0], "a", 0),
            ])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].metadata.source_document, "a");
        assert_eq!(hits[1].metadata.source_document, "b");
    }

    #[tokio::test]
    async fn zero_norm_entries_are_skipped_in_queries() {
        let index = InMemoryIndex::new();
        index
            .insert(vec![
                entry("zero_0", vec![0.0, 0.0], "zero", 0),
                entry("a_0", vec![1.0, 0.0], "a", 0),
            ])
            .await
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.source_document, "a");
    }

    #[tokio::test]
    async fn reset_forgets_entries_and_dimensionality() {
        let index = InMemoryIndex::new();
        index
            .insert(vec![entry("a_0", vec![1.0, 0.0, 0.0], "a", 0)])
            .await
            .unwrap();
        index.reset().await.unwrap();

        assert_eq!(index.count().await.unwrap(), 0);
        assert_eq!(index.stats().await.unwrap().dimension, None);

        // A different dimensionality is acceptable after a reset.
        index
            .insert(vec![entry("b_0", vec![1.0, 0.0], "b", 0)])
            .await
            .unwrap();
        assert_eq!(index.stats().await.unwrap().dimension, Some(2));
    }

    #[tokio::test]
    async fn stats_count_distinct_sources() {
        let index = InMemoryIndex::new();
        index
            .insert(vec![
                entry("a_0", vec![1.0, 0.0], "a", 0),
                entry("a_1", vec![0.0, 1.0], "a", 1),
                entry("b_0", vec![1.0, 1.0], "b", 0),
            ])
            .await
            .unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.source_documents, 2);
    }
}
