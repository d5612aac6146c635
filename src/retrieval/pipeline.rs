//! Query-time orchestration: embed, search, filter, truncate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::embeddings::EmbeddingGateway;
use crate::index::{RetrievalResult, VectorIndex};
use crate::types::EngineError;

/// Default number of nearest neighbors fetched from the index.
pub const DEFAULT_TOP_K: usize = 5;
/// Default maximum cosine distance for a result to count as relevant.
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 0.8;
/// Default cap on results handed to the conversational layer.
pub const DEFAULT_MAX_CONTEXT: usize = 3;

/// Tunables for one retrieval call.
///
/// `distance_threshold` trades recall for precision: lower keeps fewer,
/// more relevant results. `max_context` bounds prompt size downstream. The
/// defaults are carried from the original assistant and are knobs, not
/// recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    /// Nearest neighbors to fetch before filtering.
    pub top_k: usize,
    /// Strict upper bound on cosine distance for kept results.
    pub distance_threshold: f32,
    /// Maximum number of results returned after filtering.
    pub max_context: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            max_context: DEFAULT_MAX_CONTEXT,
        }
    }
}

impl RetrievalOptions {
    /// Options with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the neighbor count.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the relevance threshold.
    #[must_use]
    pub fn with_distance_threshold(mut self, distance_threshold: f32) -> Self {
        self.distance_threshold = distance_threshold;
        self
    }

    /// Replace the context cap.
    #[must_use]
    pub fn with_max_context(mut self, max_context: usize) -> Self {
        self.max_context = max_context;
        self
    }

    /// Check that the options describe a satisfiable query.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for a zero `top_k` or
    /// `max_context`, or a non-finite or non-positive threshold.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.top_k == 0 {
            return Err(EngineError::InvalidArgument(
                "top_k must be greater than zero".into(),
            ));
        }
        if self.max_context == 0 {
            return Err(EngineError::InvalidArgument(
                "max_context must be greater than zero".into(),
            ));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "distance_threshold must be a positive finite number, got {}",
                self.distance_threshold
            )));
        }
        Ok(())
    }
}

/// Turns a free-text query into ranked, relevance-filtered grounding
/// snippets.
///
/// The pipeline shares the engine's [`VectorIndex`] handle and never
/// mutates it.
#[derive(Clone)]
pub struct RetrievalPipeline {
    gateway: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
    defaults: RetrievalOptions,
}

impl RetrievalPipeline {
    /// Pipeline over `gateway` and `index` with stock default options.
    #[must_use]
    pub fn new(gateway: EmbeddingGateway, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            gateway,
            index,
            defaults: RetrievalOptions::default(),
        }
    }

    /// Replace the per-pipeline default options.
    #[must_use]
    pub fn with_defaults(mut self, defaults: RetrievalOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Retrieve with the pipeline's default options, degrading every
    /// failure to "no grounding context".
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievalResult> {
        self.retrieve_with(query, self.defaults).await
    }

    /// Retrieve with explicit options, degrading every failure to "no
    /// grounding context".
    ///
    /// Degradation keeps a conversational turn alive when the embedding
    /// service is down: the assistant answers without grounding instead of
    /// erroring out. Callers that need the cause use
    /// [`RetrievalPipeline::try_retrieve_with`].
    pub async fn retrieve_with(
        &self,
        query: &str,
        options: RetrievalOptions,
    ) -> Vec<RetrievalResult> {
        match self.try_retrieve_with(query, options).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(error = %err, "retrieval degraded to empty grounding context");
                Vec::new()
            }
        }
    }

    /// Retrieve with the pipeline's default options, propagating failures.
    ///
    /// # Errors
    ///
    /// See [`RetrievalPipeline::try_retrieve_with`].
    pub async fn try_retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>, EngineError> {
        self.try_retrieve_with(query, self.defaults).await
    }

    /// Retrieve with explicit options, propagating failures.
    ///
    /// An empty index short-circuits to an empty result before any
    /// embedding call is made, so an idle assistant costs no external
    /// traffic.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] for unsatisfiable options,
    /// [`EngineError::EmbeddingFailed`]/[`EngineError::EmbeddingTimedOut`]
    /// from the gateway, or [`EngineError::DimensionMismatch`] when the
    /// query vector does not match the index.
    #[instrument(skip(self, query), fields(top_k = options.top_k), err)]
    pub async fn try_retrieve_with(
        &self,
        query: &str,
        options: RetrievalOptions,
    ) -> Result<Vec<RetrievalResult>, EngineError> {
        options.validate()?;

        if self.index.count().await? == 0 {
            tracing::debug!("index is empty, skipping the embedding call");
            return Ok(Vec::new());
        }

        let vector = self.gateway.embed_one(query).await?;
        let hits = self.index.query(&vector, options.top_k).await?;

        let fetched = hits.len();
        let mut results: Vec<RetrievalResult> = hits
            .into_iter()
            .filter(|hit| hit.distance < options.distance_threshold)
            .collect();
        results.truncate(options.max_context);

        tracing::debug!(
            fetched,
            kept = results.len(),
            threshold = options.distance_threshold,
            "retrieval complete"
        );
        Ok(results)
    }
}
