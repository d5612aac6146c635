//! Embedding providers and the gateway that fronts them.
//!
//! The module provides three pieces:
//!
//! * [`EmbeddingProvider`] — the seam an external embedding service plugs
//!   into: a batch of texts in, one vector per text out, order preserved.
//! * [`EmbeddingGateway`] — the engine-facing wrapper that enforces the
//!   batch contract (count and order) and bounds each call with an optional
//!   caller-supplied timeout.
//! * Shipped providers: [`OllamaEmbeddings`] for a local Ollama server and
//!   [`MockEmbeddingProvider`] for tests and offline demos.
//!
//! The gateway is a pure function modulo external-service latency and
//! errors: it performs no caching, no re-batching, and no retries. A failed
//! batch fails as a whole — partial success is the caller's choice via
//! smaller batches.

pub mod mock;
pub mod ollama;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::EngineError;

pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaEmbeddings;

/// An external embedding service behind a narrow functional contract.
///
/// Implementations must preserve input order and produce vectors of a fixed
/// dimensionality for the lifetime of the provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input, order preserved.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmbeddingFailed`] when the underlying service
    /// fails; the whole batch fails as a unit.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError>;

    /// Short identifier of the backing model, for logs and diagnostics.
    fn model_id(&self) -> &str;
}

/// Engine-facing front for an [`EmbeddingProvider`].
///
/// Wraps the provider with the two guarantees the pipelines rely on: a
/// response always has exactly one vector per input (anything else is an
/// [`EngineError::EmbeddingFailed`]), and a call never outlives the
/// configured timeout (elapse is an [`EngineError::EmbeddingTimedOut`]).
#[derive(Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Option<Duration>,
}

impl EmbeddingGateway {
    /// Gateway over `provider` with no timeout bound.
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Bound every embed call by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Identifier of the backing model.
    #[must_use]
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Embed a batch of texts.
    ///
    /// An empty batch short-circuits to an empty response without touching
    /// the provider.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmbeddingTimedOut`] when the configured timeout
    /// elapses, [`EngineError::EmbeddingFailed`] on provider failure or a
    /// count-mismatched response.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            batch = texts.len(),
            model = self.provider.model_id(),
            "embedding batch"
        );

        let result = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.provider.embed_batch(texts)).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(EngineError::EmbeddingTimedOut {
                            batch_len: texts.len(),
                            waited_ms: limit.as_millis() as u64,
                        });
                    }
                }
            }
            None => self.provider.embed_batch(texts).await,
        };
        let vectors = result?;

        if vectors.len() != texts.len() {
            return Err(EngineError::EmbeddingFailed {
                batch_len: texts.len(),
                detail: format!(
                    "provider returned {} vectors for {} inputs",
                    vectors.len(),
                    texts.len()
                ),
            });
        }
        Ok(vectors)
    }

    /// Embed a single text as a one-element batch.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`EmbeddingGateway::embed`].
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors.pop().ok_or_else(|| EngineError::EmbeddingFailed {
            batch_len: 1,
            detail: "provider returned no vector for a one-element batch".into(),
        })
    }
}

impl fmt::Debug for EmbeddingGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingGateway")
            .field("model", &self.provider.model_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_batch_never_reaches_the_provider() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let gateway = EmbeddingGateway::new(provider.clone());

        let vectors = gateway.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn one_vector_per_input_in_order() {
        let provider = Arc::new(MockEmbeddingProvider::new());
        let gateway = EmbeddingGateway::new(provider.clone());

        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let vectors = gateway.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);

        // Re-embedding individually must reproduce the batch vectors in the
        // same slots: the gateway preserves order.
        let first = gateway.embed_one("alpha beta").await.unwrap();
        let second = gateway.embed_one("gamma delta").await.unwrap();
        assert_eq!(vectors[0], first);
        assert_eq!(vectors[1], second);
    }

    #[tokio::test]
    async fn provider_failure_carries_the_batch_size() {
        let provider = Arc::new(MockEmbeddingProvider::new().with_failure("boom"));
        let gateway = EmbeddingGateway::new(provider);

        let err = gateway
            .embed(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap_err();
        match err {
            EngineError::EmbeddingFailed { batch_len, detail } => {
                assert_eq!(batch_len, 3);
                assert!(detail.contains("boom"));
            }
            other => panic!("expected EmbeddingFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider =
            Arc::new(MockEmbeddingProvider::new().with_delay(Duration::from_secs(60)));
        let gateway =
            EmbeddingGateway::new(provider).with_timeout(Duration::from_millis(250));

        let err = gateway.embed(&["slow".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::EmbeddingTimedOut {
                batch_len: 1,
                waited_ms: 250
            }
        ));
    }
}
