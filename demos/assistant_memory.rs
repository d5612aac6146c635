//! Ingest a small knowledge base and answer queries with grounded context.
//!
//! This example shows how to:
//! - Build an [`Engine`] with the deterministic mock embedder (no network)
//! - Ingest a batch of documents, with one failing document isolated
//! - Inspect index statistics after ingestion
//! - Retrieve ranked chunks and print the assembled grounding context
//!
//! Configuration comes from `GROUNDSMITH_*` environment variables (or a
//! `.env` file) with sensible defaults, so it runs without any setup:
//!
//! ```bash
//! cargo run --example assistant_memory
//! ```

use groundsmith::{Document, Engine, EngineConfig, EngineError, MockEmbeddingProvider};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    init_tracing();

    let config = EngineConfig::from_env()?;
    println!(
        "chunk window {} / overlap {}, top_k {}, threshold {}, context cap {}",
        config.segmenter.chunk_size,
        config.segmenter.overlap,
        config.retrieval.top_k,
        config.retrieval.distance_threshold,
        config.retrieval.max_context,
    );

    let engine = Engine::builder()
        .provider(MockEmbeddingProvider::new())
        .config(config)
        .build()?;

    let documents = [
        Document::new(
            "kb/hours",
            "Support is available from 9am to 5pm, Monday through Friday. \
             Outside those hours, leave a message and the team will reply the next business day.",
        ),
        Document::new(
            "kb/returns",
            "Purchases can be returned within 30 days with a receipt. \
             Refunds are issued to the original payment method within five business days.",
        ),
        Document::new(
            "kb/shipping",
            "Standard shipping takes three to five business days. \
             Express shipping delivers in one to two business days for an extra fee.",
        ),
        // Intentionally empty: demonstrates per-document failure isolation.
        Document::new("kb/broken", "   "),
    ];

    println!("\n→ Ingesting {} documents", documents.len());
    let summary = engine.ingest_batch(&documents).await;
    for report in summary.reports() {
        match report.failure() {
            None => println!(
                "   ✓ {} ({} chunks)",
                report.source_document(),
                report.chunk_count()
            ),
            Some(err) => println!("   ✗ {} ({err})", report.source_document()),
        }
    }

    let stats = engine.stats().await?;
    println!("\n✅ Ingestion complete!");
    println!("  documents indexed : {}", summary.documents_succeeded());
    println!("  documents failed  : {}", summary.documents_failed());
    println!("  chunks indexed    : {}", summary.chunks_indexed());
    println!("  vector dimension  : {:?}", stats.dimension);

    for query in [
        "when can I reach support?",
        "how do returns and refunds work?",
        "what color is the sky?",
    ] {
        println!("\n→ Query: {query}");
        let hits = engine.retrieve(query).await;
        for hit in &hits {
            println!(
                "   {:.3}  {} #{}",
                hit.distance, hit.metadata.source_document, hit.metadata.sequence_index
            );
        }
        match engine.grounding(query).await {
            Some(context) => println!("--- grounding ---\n{}", context.text()),
            None => println!("   (no relevant context, answering ungrounded)"),
        }
    }

    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_env_filter("info").finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
