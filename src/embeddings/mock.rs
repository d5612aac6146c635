//! Deterministic embedding provider for tests and offline demos.
//!
//! Real embedding models map semantically close texts to nearby vectors.
//! The mock approximates that cheaply: a text's vector is the sum of
//! hash-derived unit directions of its lowercased words, so texts sharing
//! words land measurably closer than texts sharing none. That is enough for
//! retrieval tests to exercise ranking and thresholds with stable,
//! reproducible numbers — no network, no model files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::types::EngineError;

/// Default dimensionality of mock vectors.
pub const MOCK_DIMENSIONS: usize = 32;

/// In-process [`EmbeddingProvider`] with deterministic output.
///
/// Besides embedding, the mock records how often it was called (for
/// asserting that short-circuit paths really skip the provider) and can be
/// configured to fail or stall, to exercise the error and timeout paths.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
    calls: AtomicUsize,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingProvider {
    /// Provider producing [`MOCK_DIMENSIONS`]-dimensional vectors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimensions: MOCK_DIMENSIONS,
            calls: AtomicUsize::new(0),
            fail_with: None,
            delay: None,
        }
    }

    /// Override the output dimensionality.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Make every call fail with the given detail.
    #[must_use]
    pub fn with_failure(mut self, detail: impl Into<String>) -> Self {
        self.fail_with = Some(detail.into());
        self
    }

    /// Make every call sleep before responding.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `embed_batch` calls observed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let seed = hasher.finish();
            for (i, slot) in vector.iter_mut().enumerate() {
                *slot += component(seed, i as u64);
            }
        }
        vector
    }
}

/// Pseudo-random component in `[-1, 1]` derived from a word hash and a
/// dimension index. Deterministic across runs and platforms.
fn component(seed: u64, index: u64) -> f32 {
    let mut x = seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    (x as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(detail) = &self.fail_with {
            return Err(EngineError::EmbeddingFailed {
                batch_len: texts.len(),
                detail: detail.clone(),
            });
        }
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn model_id(&self) -> &str {
        "mock-embedder"
    }
}
