//! Per-document ingestion orchestration.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use super::report::{IngestionReport, IngestionSummary};
use crate::embeddings::EmbeddingGateway;
use crate::index::{ChunkMetadata, IndexEntry, VectorIndex};
use crate::segmenter::{Chunk, Segmenter};
use crate::types::EngineError;

/// An already-extracted document handed in by the hosting application.
///
/// Text extraction from binary formats (PDF and friends) happens outside
/// the engine; by the time a document reaches ingestion it is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier, typically the uploaded filename.
    pub id: String,
    /// Extracted text content.
    pub raw_text: String,
}

impl Document {
    /// Document from an id and its extracted text.
    #[must_use]
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// Orchestrates raw text → chunks → embeddings → index insert for one
/// document at a time.
///
/// Failure policy: every step up to the index insert produces no persisted
/// side effect, so a failed document leaves the index exactly as it was.
/// The insert itself is one atomic batch — a concurrent reader sees all of
/// a document's chunks or none of them.
#[derive(Clone)]
pub struct IngestionPipeline {
    segmenter: Segmenter,
    gateway: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
}

impl IngestionPipeline {
    /// Pipeline over the given segmenter, gateway, and shared index handle.
    #[must_use]
    pub fn new(
        segmenter: Segmenter,
        gateway: EmbeddingGateway,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            segmenter,
            gateway,
            index,
        }
    }

    /// Ingest one document, reporting success or the failure that stopped
    /// it. Never panics, never aborts sibling documents.
    #[instrument(skip(self, document), fields(document = %document.id))]
    pub async fn ingest(&self, document: &Document) -> IngestionReport {
        match self.ingest_inner(document).await {
            Ok(chunk_count) => {
                tracing::debug!(chunks = chunk_count, "document ingested");
                IngestionReport::success(&document.id, chunk_count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "document ingestion failed");
                IngestionReport::failed(&document.id, err)
            }
        }
    }

    async fn ingest_inner(&self, document: &Document) -> Result<usize, EngineError> {
        if document.raw_text.trim().is_empty() {
            return Err(EngineError::NoExtractableText {
                source_document: document.id.clone(),
            });
        }

        let chunks = self
            .segmenter
            .segment_document(&document.id, &document.raw_text);
        if chunks.is_empty() {
            return Err(EngineError::NoValidChunks {
                source_document: document.id.clone(),
            });
        }

        // One ordered batch for the whole document, preserving the
        // chunk-to-vector correspondence.
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.gateway.embed(&texts).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let Chunk {
                    text,
                    source_document,
                    sequence_index,
                } = chunk;
                let id = chunk_entry_id(&source_document, sequence_index);
                IndexEntry::new(id, vector, text, ChunkMetadata::new(source_document, sequence_index))
            })
            .collect();

        let ids = self.index.insert(entries).await?;
        Ok(ids.len())
    }

    /// Ingest several documents, isolating failures per document.
    ///
    /// Documents are processed in order; a failing document is reported and
    /// the batch moves on. The summary carries one report per input plus
    /// aggregate totals.
    pub async fn ingest_batch(&self, documents: &[Document]) -> IngestionSummary {
        let mut reports = Vec::with_capacity(documents.len());
        for document in documents {
            reports.push(self.ingest(document).await);
        }
        let summary = IngestionSummary::new(reports);
        tracing::info!(
            documents = documents.len(),
            failed = summary.documents_failed(),
            chunks = summary.chunks_indexed(),
            "batch ingestion finished"
        );
        summary
    }
}

/// `{source}_{sequence}_{random}` — unique even across re-ingestions of a
/// same-named document.
fn chunk_entry_id(source_document: &str, sequence_index: usize) -> String {
    let disambiguator = Uuid::new_v4().simple().to_string();
    format!(
        "{source_document}_{sequence_index}_{}",
        &disambiguator[..8]
    )
}
