//! Engine configuration with environment-variable resolution.
//!
//! Defaults carry the original assistant's knobs (1000/200 chunking,
//! 5/0.8/3 retrieval); every one of them is overridable through the builder
//! setters or `GROUNDSMITH_*` environment variables. A `.env` file is
//! honored when present.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalOptions;
use crate::segmenter::SegmenterConfig;
use crate::types::EngineError;

const ENV_CHUNK_SIZE: &str = "GROUNDSMITH_CHUNK_SIZE";
const ENV_CHUNK_OVERLAP: &str = "GROUNDSMITH_CHUNK_OVERLAP";
const ENV_TOP_K: &str = "GROUNDSMITH_TOP_K";
const ENV_DISTANCE_THRESHOLD: &str = "GROUNDSMITH_DISTANCE_THRESHOLD";
const ENV_MAX_CONTEXT: &str = "GROUNDSMITH_MAX_CONTEXT";
const ENV_EMBED_TIMEOUT_MS: &str = "GROUNDSMITH_EMBED_TIMEOUT_MS";

/// Engine-wide configuration: segmentation, retrieval defaults, and the
/// embedding timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window width and overlap for the segmenter.
    pub segmenter: SegmenterConfig,
    /// Default retrieval tunables; individual calls may override them.
    pub retrieval: RetrievalOptions,
    /// Upper bound for one embedding batch call. `None` leaves calls
    /// unbounded.
    pub embed_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            retrieval: RetrievalOptions::default(),
            embed_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Configuration with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the segmenter settings.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replace the default retrieval options.
    #[must_use]
    pub fn with_retrieval(mut self, retrieval: RetrievalOptions) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Bound every embedding batch call by `timeout`.
    #[must_use]
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = Some(timeout);
        self
    }

    /// Defaults overlaid with any `GROUNDSMITH_*` environment variables.
    ///
    /// Loads a `.env` file first when one exists. Recognized variables:
    /// `GROUNDSMITH_CHUNK_SIZE`, `GROUNDSMITH_CHUNK_OVERLAP`,
    /// `GROUNDSMITH_TOP_K`, `GROUNDSMITH_DISTANCE_THRESHOLD`,
    /// `GROUNDSMITH_MAX_CONTEXT`, `GROUNDSMITH_EMBED_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when a variable fails to
    /// parse or the resolved configuration is inconsistent.
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(chunk_size) = parse_env(ENV_CHUNK_SIZE)? {
            config.segmenter.chunk_size = chunk_size;
        }
        if let Some(overlap) = parse_env(ENV_CHUNK_OVERLAP)? {
            config.segmenter.overlap = overlap;
        }
        if let Some(top_k) = parse_env(ENV_TOP_K)? {
            config.retrieval.top_k = top_k;
        }
        if let Some(threshold) = parse_env(ENV_DISTANCE_THRESHOLD)? {
            config.retrieval.distance_threshold = threshold;
        }
        if let Some(max_context) = parse_env(ENV_MAX_CONTEXT)? {
            config.retrieval.max_context = max_context;
        }
        if let Some(timeout_ms) = parse_env::<u64>(ENV_EMBED_TIMEOUT_MS)? {
            config.embed_timeout = Some(Duration::from_millis(timeout_ms));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when the segmenter or
    /// retrieval settings are unsatisfiable.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.segmenter.validate()?;
        self.retrieval.validate()?;
        Ok(())
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, EngineError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| EngineError::InvalidArgument(format!("{key}={raw} is invalid: {err}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_stock_knobs() {
        let config = EngineConfig::default();
        assert_eq!(config.segmenter.chunk_size, 1000);
        assert_eq!(config.segmenter.overlap, 200);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.max_context, 3);
        assert!(config.embed_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters_compose() {
        let config = EngineConfig::new()
            .with_segmenter(SegmenterConfig::new(400, 50))
            .with_retrieval(RetrievalOptions::new().with_top_k(10))
            .with_embed_timeout(Duration::from_secs(5));

        assert_eq!(config.segmenter.chunk_size, 400);
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.embed_timeout, Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_inconsistent_settings() {
        let config = EngineConfig::new().with_segmenter(SegmenterConfig::new(100, 100));
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
