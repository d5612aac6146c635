//! High-level facade wiring the segmenter, gateway, index, and pipelines.
//!
//! [`Engine`] owns one shared vector index and exposes the ingestion and
//! retrieval pipelines behind a single handle. Construction goes through
//! [`EngineBuilder`], which only requires an embedding provider; everything
//! else has working defaults.

use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::embeddings::{EmbeddingGateway, EmbeddingProvider};
use crate::index::{InMemoryIndex, IndexStats, RetrievalResult, VectorIndex};
use crate::ingestion::{Document, IngestionPipeline, IngestionReport, IngestionSummary};
use crate::retrieval::{GroundingContext, RetrievalOptions, RetrievalPipeline};
use crate::segmenter::Segmenter;
use crate::types::EngineError;

/// One ingestion/retrieval engine over a shared vector index.
///
/// # Examples
///
/// ```
/// use groundsmith::{Document, Engine, MockEmbeddingProvider};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), groundsmith::EngineError> {
/// let engine = Engine::builder()
///     .provider(MockEmbeddingProvider::new())
///     .build()?;
///
/// let report = engine
///     .ingest(&Document::new("notes", "Alpha beta gamma. Delta epsilon."))
///     .await;
/// assert!(report.is_success());
///
/// let hits = engine.retrieve("alpha beta").await;
/// assert!(!hits.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    ingestion: IngestionPipeline,
    retrieval: RetrievalPipeline,
    index: Arc<dyn VectorIndex>,
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Segment, embed, and index one document.
    pub async fn ingest(&self, document: &Document) -> IngestionReport {
        self.ingestion.ingest(document).await
    }

    /// Ingest documents in order, isolating failures per document.
    pub async fn ingest_batch(&self, documents: &[Document]) -> IngestionSummary {
        self.ingestion.ingest_batch(documents).await
    }

    /// Retrieve with the engine's default options, degrading errors to an
    /// empty result.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievalResult> {
        self.retrieval.retrieve(query).await
    }

    /// Retrieve with explicit options, degrading errors to an empty result.
    pub async fn retrieve_with(&self, query: &str, options: RetrievalOptions) -> Vec<RetrievalResult> {
        self.retrieval.retrieve_with(query, options).await
    }

    /// Retrieve with the engine's default options, surfacing failures.
    ///
    /// # Errors
    ///
    /// Propagates embedding and index errors instead of swallowing them.
    pub async fn try_retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>, EngineError> {
        self.retrieval.try_retrieve(query).await
    }

    /// Retrieve with explicit options, surfacing failures.
    ///
    /// # Errors
    ///
    /// Propagates embedding and index errors instead of swallowing them.
    pub async fn try_retrieve_with(
        &self,
        query: &str,
        options: RetrievalOptions,
    ) -> Result<Vec<RetrievalResult>, EngineError> {
        self.retrieval.try_retrieve_with(query, options).await
    }

    /// Retrieve and assemble the hits into one attributed context block.
    ///
    /// Returns `None` when nothing relevant is indexed, so callers can fall
    /// through to an ungrounded answer.
    pub async fn grounding(&self, query: &str) -> Option<GroundingContext> {
        GroundingContext::from_results(self.retrieve(query).await)
    }

    /// Number of indexed chunks.
    ///
    /// # Errors
    ///
    /// Propagates index failures.
    pub async fn count(&self) -> Result<usize, EngineError> {
        self.index.count().await
    }

    /// Snapshot of index occupancy.
    ///
    /// # Errors
    ///
    /// Propagates index failures.
    pub async fn stats(&self) -> Result<IndexStats, EngineError> {
        self.index.stats().await
    }

    /// Drop every indexed chunk and clear the established dimensionality.
    ///
    /// # Errors
    ///
    /// Propagates index failures.
    pub async fn reset(&self) -> Result<(), EngineError> {
        self.index.reset().await
    }
}

// The pipelines hold trait objects without a `Debug` bound, so render the
// configuration and elide the rest.
impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`] instances.
#[derive(Default)]
pub struct EngineBuilder {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    config: Option<EngineConfig>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl EngineBuilder {
    /// Set the embedding provider.
    ///
    /// This is required before calling [`build()`](Self::build).
    #[must_use]
    pub fn provider(mut self, provider: impl EmbeddingProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set the embedding provider from an existing Arc.
    ///
    /// Use this to share a provider across engines.
    #[must_use]
    pub fn provider_arc(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the default configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific index instead of a fresh [`InMemoryIndex`].
    ///
    /// Use this to share one index across engines or to substitute another
    /// [`VectorIndex`] implementation.
    #[must_use]
    pub fn index_arc(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Validate the configuration and wire the pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when no provider was set or
    /// the configuration is inconsistent.
    pub fn build(self) -> Result<Engine, EngineError> {
        let provider = self.provider.ok_or_else(|| {
            EngineError::InvalidArgument("an embedding provider is required".into())
        })?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let index = self
            .index
            .unwrap_or_else(|| Arc::new(InMemoryIndex::new()));
        let segmenter = Segmenter::new(config.segmenter)?;
        let mut gateway = EmbeddingGateway::new(provider);
        if let Some(timeout) = config.embed_timeout {
            gateway = gateway.with_timeout(timeout);
        }

        let ingestion = IngestionPipeline::new(segmenter, gateway.clone(), Arc::clone(&index));
        let retrieval =
            RetrievalPipeline::new(gateway, Arc::clone(&index)).with_defaults(config.retrieval);

        Ok(Engine {
            config,
            ingestion,
            retrieval,
            index,
        })
    }
}
