//! Per-document and aggregate ingestion outcomes.

use crate::types::EngineError;

/// Summary of one document's ingestion.
///
/// A report is produced for every document, success or failure; the failure
/// case carries the originating [`EngineError`] so callers can distinguish
/// bad input (`NoExtractableText`, `NoValidChunks`) from retryable service
/// trouble.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    source_document: String,
    chunk_count: usize,
    failure: Option<EngineError>,
}

impl IngestionReport {
    pub(crate) fn success(source_document: impl Into<String>, chunk_count: usize) -> Self {
        Self {
            source_document: source_document.into(),
            chunk_count,
            failure: None,
        }
    }

    pub(crate) fn failed(source_document: impl Into<String>, error: EngineError) -> Self {
        Self {
            source_document: source_document.into(),
            chunk_count: 0,
            failure: Some(error),
        }
    }

    /// Identifier of the ingested document.
    #[must_use]
    pub fn source_document(&self) -> &str {
        &self.source_document
    }

    /// Chunks successfully indexed for this document. Zero on failure.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// The failure that stopped this document, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&EngineError> {
        self.failure.as_ref()
    }

    /// Whether the document made it into the index.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregate outcome of a multi-document ingestion.
///
/// One report per document, in submission order, plus the totals the
/// hosting application surfaces to the user after a batch upload.
#[derive(Debug, Clone, Default)]
pub struct IngestionSummary {
    reports: Vec<IngestionReport>,
}

impl IngestionSummary {
    pub(crate) fn new(reports: Vec<IngestionReport>) -> Self {
        Self { reports }
    }

    /// Per-document reports in submission order.
    #[must_use]
    pub fn reports(&self) -> &[IngestionReport] {
        &self.reports
    }

    /// Number of documents that were fully indexed.
    #[must_use]
    pub fn documents_succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// Number of documents that failed.
    #[must_use]
    pub fn documents_failed(&self) -> usize {
        self.reports.len() - self.documents_succeeded()
    }

    /// Total chunks indexed across the batch.
    #[must_use]
    pub fn chunks_indexed(&self) -> usize {
        self.reports.iter().map(IngestionReport::chunk_count).sum()
    }

    /// Consume the summary, yielding the per-document reports.
    #[must_use]
    pub fn into_reports(self) -> Vec<IngestionReport> {
        self.reports
    }
}
