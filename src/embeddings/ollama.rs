//! Embedding provider backed by a local Ollama server.
//!
//! Speaks the `/api/embed` endpoint: a single request carries the whole
//! batch and the response carries one embedding per input, in order. The
//! provider maps transport failures, non-success statuses, and malformed
//! bodies to [`EngineError::EmbeddingFailed`]; timeout bounding lives in the
//! gateway, not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::EmbeddingProvider;
use crate::types::EngineError;

/// Default Ollama endpoint for a local install.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

const ENV_OLLAMA_URL: &str = "GROUNDSMITH_OLLAMA_URL";
const ENV_EMBED_MODEL: &str = "GROUNDSMITH_EMBED_MODEL";

/// How much of an error body to keep in the failure detail.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Shape of Ollama's error responses: `{"error": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`EmbeddingProvider`] over an Ollama-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl OllamaEmbeddings {
    /// Provider for `model` served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when `base_url` is not a
    /// valid URL.
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, EngineError> {
        let mut base = Url::parse(base_url).map_err(|err| {
            EngineError::InvalidArgument(format!("invalid embedding base url '{base_url}': {err}"))
        })?;
        // Url::join drops the last path segment without this.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base.join("api/embed").map_err(|err| {
            EngineError::InvalidArgument(format!("cannot build embed endpoint: {err}"))
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            model: model.into(),
        })
    }

    /// Provider configured from `GROUNDSMITH_OLLAMA_URL` and
    /// `GROUNDSMITH_EMBED_MODEL`, falling back to the local defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when the configured URL does
    /// not parse.
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var(ENV_OLLAMA_URL).unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model =
            std::env::var(ENV_EMBED_MODEL).unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        Self::new(&base_url, model)
    }

    fn failure(&self, batch_len: usize, detail: impl Into<String>) -> EngineError {
        EngineError::EmbeddingFailed {
            batch_len,
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|err| self.failure(texts.len(), err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Ollama reports errors as {"error": "..."}; fall back to the
            // raw (truncated) body for anything else in front of the server.
            let detail: String = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                Err(_) => body.chars().take(ERROR_BODY_LIMIT).collect(),
            };
            return Err(self.failure(
                texts.len(),
                format!("embedding endpoint returned {status}: {detail}"),
            ));
        }

        let payload: EmbedResponse = response
            .json()
            .await
            .map_err(|err| self.failure(texts.len(), format!("malformed embed response: {err}")))?;
        Ok(payload.embeddings)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
