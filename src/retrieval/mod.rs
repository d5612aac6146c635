//! Retrieval pipeline: query text to ranked grounding context.
//!
//! * [`pipeline`] — embed the query, search the index, filter by relevance,
//!   truncate to the context budget.
//! * [`context`] — assemble the surviving snippets into attribution-tagged
//!   grounding text.

pub mod context;
pub mod pipeline;

pub use context::GroundingContext;
pub use pipeline::{
    DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MAX_CONTEXT, DEFAULT_TOP_K, RetrievalOptions,
    RetrievalPipeline,
};
