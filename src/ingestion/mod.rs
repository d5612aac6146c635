//! Ingestion pipeline: extracted documents to indexed chunks.
//!
//! * [`pipeline`] — the per-document orchestration (segment, embed in one
//!   batch, insert atomically) and the batch loop with per-document
//!   failure isolation.
//! * [`report`] — per-document [`IngestionReport`]s and the aggregate
//!   [`IngestionSummary`] a batch upload surfaces to the user.

pub mod pipeline;
pub mod report;

pub use pipeline::{Document, IngestionPipeline};
pub use report::{IngestionReport, IngestionSummary};
