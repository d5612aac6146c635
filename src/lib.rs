//! # Groundsmith: Document Ingestion and Semantic Retrieval
//!
//! Groundsmith turns raw documents into an embedded, queryable knowledge
//! base: it segments text into overlapping chunks, embeds them through a
//! pluggable gateway, stores the vectors in a cosine-distance index, and
//! assembles retrieved chunks into attributed grounding context for a
//! downstream assistant.
//!
//! ```text
//! Document ──► Segmenter ──► chunks ──► EmbeddingGateway ──► vectors
//!                                             │
//!                                             ├─► MockEmbeddingProvider
//!                                             └─► OllamaEmbeddings
//!
//! chunks + vectors ──► IngestionPipeline ──► VectorIndex (InMemoryIndex)
//!
//! query ──► RetrievalPipeline ──► ranked hits ──► GroundingContext
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use groundsmith::{Document, Engine, MockEmbeddingProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), groundsmith::EngineError> {
//! let engine = Engine::builder()
//!     .provider(MockEmbeddingProvider::new())
//!     .build()?;
//!
//! let summary = engine
//!     .ingest_batch(&[
//!         Document::new("kb/hours", "Support hours are 9am to 5pm, Monday to Friday."),
//!         Document::new("kb/returns", "Returns are accepted within 30 days with a receipt."),
//!     ])
//!     .await;
//! assert_eq!(summary.documents_succeeded(), 2);
//!
//! if let Some(context) = engine.grounding("when is support open?").await {
//!     println!("{}", context.text());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`segmenter`] - Sliding-window chunking with sentence-boundary snapping
//! - [`embeddings`] - Provider trait, batching gateway, mock and Ollama backends
//! - [`index`] - Vector index trait, cosine distance, in-memory backend
//! - [`ingestion`] - Segment, embed, and index documents with per-document reports
//! - [`retrieval`] - Query pipeline, relevance thresholding, context assembly
//! - [`engine`] - Facade wiring both pipelines onto one shared index
//! - [`config`] - Defaults plus `GROUNDSMITH_*` environment overrides
//! - [`types`] - Crate-wide error type

pub mod config;
pub mod embeddings;
pub mod engine;
pub mod index;
pub mod ingestion;
pub mod retrieval;
pub mod segmenter;
pub mod types;

pub use config::EngineConfig;
pub use embeddings::{
    EmbeddingGateway, EmbeddingProvider, MockEmbeddingProvider, OllamaEmbeddings,
};
pub use engine::{Engine, EngineBuilder};
pub use index::{
    ChunkMetadata, InMemoryIndex, IndexEntry, IndexStats, RetrievalResult, VectorIndex,
};
pub use ingestion::{Document, IngestionPipeline, IngestionReport, IngestionSummary};
pub use retrieval::{GroundingContext, RetrievalOptions, RetrievalPipeline};
pub use segmenter::{Chunk, Segmenter, SegmenterConfig};
pub use types::EngineError;
