//! Crate-wide error taxonomy.
//!
//! Every fallible operation in the engine returns [`EngineError`]. The
//! variants map one-to-one onto the failure classes callers handle
//! differently: per-document ingestion failures, external embedding-service
//! failures, index misuse, and malformed arguments.

use thiserror::Error;

/// Errors surfaced by the ingestion and retrieval engine.
///
/// Document-level failures (`NoExtractableText`, `NoValidChunks`) are
/// reported per document and never abort a batch of other documents.
/// Embedding failures are kept distinct from document failures so callers
/// can apply retry/backoff against the external service without
/// re-validating their input.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The document's raw text was empty or all whitespace.
    #[error("no extractable text in document '{source_document}'")]
    NoExtractableText { source_document: String },

    /// Segmentation ran but produced zero non-empty chunks.
    #[error("no valid chunks produced for document '{source_document}'")]
    NoValidChunks { source_document: String },

    /// The embedding provider failed for a whole batch. The batch fails as a
    /// unit; no partial results are kept.
    #[error("embedding failed for batch of {batch_len}: {detail}")]
    EmbeddingFailed { batch_len: usize, detail: String },

    /// The embedding call exceeded the caller-supplied timeout.
    #[error("embedding timed out after {waited_ms}ms (batch of {batch_len})")]
    EmbeddingTimedOut { batch_len: usize, waited_ms: u64 },

    /// A vector's length differs from the index's established
    /// dimensionality. The remedy is an explicit index reset, never silent
    /// coercion.
    #[error("dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Malformed call parameters; rejected synchronously with no side
    /// effects.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    /// Whether retrying the same call can plausibly succeed.
    ///
    /// True only for external-service failures; document-level failures need
    /// different input and index failures need an operator reset.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::EmbeddingFailed { .. } | EngineError::EmbeddingTimedOut { .. }
        )
    }
}
