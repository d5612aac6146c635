//! Integration tests for the ingestion pipeline.
//!
//! These exercise the whole segment -> embed -> index path with the mock
//! embedding provider, including per-document failure isolation, rejected
//! batches, and index consistency under concurrent writers.

use std::sync::Arc;
use std::time::Duration;

use groundsmith::{
    ChunkMetadata, Document, Engine, EngineConfig, EngineError, InMemoryIndex, IndexEntry,
    MockEmbeddingProvider, RetrievalOptions, SegmenterConfig, VectorIndex,
};

/// Text that segments into exactly four chunks at chunk_size 20 / overlap 5.
const THREE_SENTENCES: &str = "Sentence one. Sentence two. Sentence three.";
const THREE_SENTENCE_CHUNKS: usize = 4;

fn small_windows() -> EngineConfig {
    EngineConfig::new().with_segmenter(SegmenterConfig::new(20, 5))
}

fn engine_with(provider: Arc<MockEmbeddingProvider>, config: EngineConfig) -> Engine {
    Engine::builder()
        .provider_arc(provider)
        .config(config)
        .build()
        .expect("engine construction")
}

#[tokio::test]
async fn ingesting_a_document_reports_indexed_chunks() {
    let provider = Arc::new(MockEmbeddingProvider::new());
    let engine = engine_with(provider.clone(), small_windows());

    let report = engine
        .ingest(&Document::new("doc1", THREE_SENTENCES))
        .await;

    assert!(report.is_success(), "failure: {:?}", report.failure());
    assert_eq!(report.source_document(), "doc1");
    assert_eq!(report.chunk_count(), THREE_SENTENCE_CHUNKS);
    assert_eq!(engine.count().await.unwrap(), THREE_SENTENCE_CHUNKS);
    // All chunks of one document go through a single embedding batch.
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn whitespace_documents_fail_without_touching_the_index() {
    let provider = Arc::new(MockEmbeddingProvider::new());
    let engine = engine_with(provider.clone(), small_windows());

    let report = engine.ingest(&Document::new("blank", "   \n\t  ")).await;

    assert!(!report.is_success());
    assert_eq!(report.chunk_count(), 0);
    assert!(matches!(
        report.failure(),
        Some(EngineError::NoExtractableText { source_document }) if source_document == "blank"
    ));
    assert_eq!(engine.count().await.unwrap(), 0);
    assert_eq!(provider.calls(), 0, "embedder must not be called");
}

#[tokio::test]
async fn batch_ingestion_isolates_failures_per_document() {
    let provider = Arc::new(MockEmbeddingProvider::new());
    let engine = engine_with(provider.clone(), small_windows());

    let documents = [
        Document::new("first", "Alpha facts live here. More alpha follows."),
        Document::new("second", "    "),
        Document::new("third", "Gamma notes live here. More gamma follows."),
    ];
    let summary = engine.ingest_batch(&documents).await;

    assert_eq!(summary.documents_succeeded(), 2);
    assert_eq!(summary.documents_failed(), 1);
    assert_eq!(summary.reports().len(), 3);
    assert!(matches!(
        summary.reports()[1].failure(),
        Some(EngineError::NoExtractableText { .. })
    ));
    assert_eq!(engine.count().await.unwrap(), summary.chunks_indexed());

    // Chunks from the documents around the failure are all queryable.
    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.source_documents, 2);
    let hits = engine
        .retrieve_with(
            "alpha gamma facts notes",
            RetrievalOptions::new()
                .with_top_k(20)
                .with_distance_threshold(2.1)
                .with_max_context(20),
        )
        .await;
    assert!(hits.iter().any(|h| h.metadata.source_document == "first"));
    assert!(hits.iter().any(|h| h.metadata.source_document == "third"));
    assert!(hits.iter().all(|h| h.metadata.source_document != "second"));
}

#[tokio::test]
async fn embedding_failure_leaves_no_partial_state() {
    let provider = Arc::new(MockEmbeddingProvider::new().with_failure("provider offline"));
    let engine = engine_with(provider.clone(), small_windows());

    let report = engine
        .ingest(&Document::new("doc1", THREE_SENTENCES))
        .await;

    assert!(matches!(
        report.failure(),
        Some(EngineError::EmbeddingFailed { batch_len, .. }) if *batch_len == THREE_SENTENCE_CHUNKS
    ));
    assert_eq!(report.chunk_count(), 0);
    assert_eq!(engine.count().await.unwrap(), 0);
}

#[tokio::test]
async fn slow_embedders_hit_the_configured_timeout() {
    let provider =
        Arc::new(MockEmbeddingProvider::new().with_delay(Duration::from_millis(200)));
    let config = small_windows().with_embed_timeout(Duration::from_millis(25));
    let engine = engine_with(provider, config);

    let report = engine
        .ingest(&Document::new("doc1", THREE_SENTENCES))
        .await;

    assert!(matches!(
        report.failure(),
        Some(EngineError::EmbeddingTimedOut { waited_ms: 25, .. })
    ));
    assert_eq!(engine.count().await.unwrap(), 0);
}

#[tokio::test]
async fn foreign_dimensionality_is_rejected_atomically() {
    // Seed the shared index with 3-dimensional vectors, then ingest through
    // an engine whose provider emits the mock's wider vectors.
    let index = Arc::new(InMemoryIndex::new());
    index
        .insert(vec![IndexEntry::new(
            "seed_0",
            vec![1.0, 0.0, 0.0],
            "seed text",
            ChunkMetadata::new("seed", 0),
        )])
        .await
        .unwrap();

    let engine = Engine::builder()
        .provider(MockEmbeddingProvider::new())
        .config(small_windows())
        .index_arc(index.clone())
        .build()
        .unwrap();

    let report = engine
        .ingest(&Document::new("doc1", THREE_SENTENCES))
        .await;

    assert!(matches!(
        report.failure(),
        Some(EngineError::DimensionMismatch { expected: 3, .. })
    ));
    assert_eq!(index.count().await.unwrap(), 1, "seed entry only");
}

#[tokio::test]
async fn reset_reopens_the_index_to_any_dimensionality() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryIndex::new());

    let narrow = Engine::builder()
        .provider(MockEmbeddingProvider::new().with_dimensions(8))
        .config(small_windows())
        .index_arc(index.clone())
        .build()
        .unwrap();
    let wide = Engine::builder()
        .provider(MockEmbeddingProvider::new().with_dimensions(16))
        .config(small_windows())
        .index_arc(index.clone())
        .build()
        .unwrap();

    assert!(narrow.ingest(&Document::new("a", THREE_SENTENCES)).await.is_success());
    // The established dimensionality shuts the wider provider out ...
    assert!(!wide.ingest(&Document::new("b", THREE_SENTENCES)).await.is_success());

    narrow.reset().await.unwrap();

    // ... until a reset forgets it.
    assert!(wide.ingest(&Document::new("b", THREE_SENTENCES)).await.is_success());
    assert_eq!(wide.stats().await.unwrap().dimension, Some(16));
}

#[tokio::test]
async fn concurrent_ingestion_never_exposes_partial_documents() {
    let provider = Arc::new(MockEmbeddingProvider::new());
    let engine = engine_with(provider, small_windows());

    let docs_per_writer = 8;
    let total_chunks = 2 * docs_per_writer * THREE_SENTENCE_CHUNKS;

    let left = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for i in 0..docs_per_writer {
                let report = engine
                    .ingest(&Document::new(format!("left_{i}"), THREE_SENTENCES))
                    .await;
                assert!(report.is_success());
            }
        })
    };
    let right = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for i in 0..docs_per_writer {
                let report = engine
                    .ingest(&Document::new(format!("right_{i}"), THREE_SENTENCES))
                    .await;
                assert!(report.is_success());
            }
        })
    };

    // Every snapshot a reader takes must contain whole documents only:
    // each document lands as one atomic batch of four chunks.
    let observer = {
        let engine = engine.clone();
        tokio::spawn(async move {
            loop {
                let count = engine.count().await.unwrap();
                assert_eq!(
                    count % THREE_SENTENCE_CHUNKS,
                    0,
                    "observed a partially ingested document"
                );
                if count == total_chunks {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    left.await.unwrap();
    right.await.unwrap();
    observer.await.unwrap();

    assert_eq!(engine.count().await.unwrap(), total_chunks);
    assert_eq!(engine.stats().await.unwrap().source_documents, 2 * docs_per_writer);
}
