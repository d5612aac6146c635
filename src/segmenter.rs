//! Windowed text segmentation with overlap and sentence-boundary snapping.
//!
//! The segmenter advances a fixed-size character window through a document.
//! Interior windows prefer to end on a sentence boundary: the window is cut
//! at the last `.` when that period sits past the window's midpoint, so
//! chunks tend to read as whole sentences instead of mid-word slices.
//! Consecutive windows overlap by a configured number of characters so that
//! context straddling a cut survives in at least one chunk.
//!
//! Segmentation is pure in-memory computation: no suspension points, no
//! side effects. Window arithmetic operates on characters, never bytes, so
//! multi-byte UTF-8 text cannot be split mid-code-point.
//!
//! ```
//! use groundsmith::segmenter::Segmenter;
//!
//! let segmenter = Segmenter::default();
//! let chunks = segmenter.segment("One sentence of text.");
//! assert_eq!(chunks, vec!["One sentence of text.".to_string()]);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::EngineError;

/// Default window width in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive windows in characters.
pub const DEFAULT_OVERLAP: usize = 200;

/// Tuning knobs for [`Segmenter`].
///
/// The defaults (1000/200) are carried over from the original assistant and
/// have no derivation beyond working well for prose; callers with unusual
/// corpora are expected to tune them rather than treat them as optimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Window width in characters. Chunks never exceed this length.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows. Must be smaller than
    /// `chunk_size`.
    pub overlap: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl SegmenterConfig {
    /// Config with explicit window width and overlap.
    #[must_use]
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Replace the window width.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Replace the overlap.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Check the `chunk_size > overlap >= 0` precondition.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when the window is empty or
    /// the overlap is not strictly smaller than the window.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_size == 0 {
            return Err(EngineError::InvalidArgument(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(EngineError::InvalidArgument(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A contiguous slice of one document's text, the unit of embedding and
/// indexing.
///
/// Chunks are immutable once created and are consumed exactly once by the
/// ingestion pipeline; only their persisted form survives in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed, non-empty chunk text.
    pub text: String,
    /// Identifier of the originating document (e.g. a filename).
    pub source_document: String,
    /// Zero-based position within the document's chunk sequence.
    pub sequence_index: usize,
}

impl Chunk {
    /// Build a chunk from its parts.
    #[must_use]
    pub fn new(
        source_document: impl Into<String>,
        sequence_index: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_document: source_document.into(),
            sequence_index,
        }
    }
}

/// Splits raw document text into overlapping, boundary-aware chunks.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    /// Segmenter with a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] when the config violates
    /// `chunk_size > overlap`.
    pub fn new(config: SegmenterConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Split `text` into chunk strings, in document order.
    ///
    /// Empty or all-whitespace input yields an empty sequence, not an error.
    /// Each returned chunk is trimmed, non-empty, and at most `chunk_size`
    /// characters long.
    ///
    /// The window advance is guaranteed to make forward progress: even when
    /// a sentence-boundary cut shrinks the window below the overlap, the
    /// next start strictly increases, so segmentation always terminates.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.overlap;

        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < total {
            // Logical window end; may overshoot the text, slicing clamps.
            let mut end = start + chunk_size;
            let window_end = end.min(total);
            let mut slice_end = window_end;

            if end < total {
                // Interior window: snap to the last period when it sits
                // strictly past the window midpoint.
                if let Some(period) = chars[start..window_end].iter().rposition(|&c| c == '.') {
                    if period * 2 > chunk_size {
                        slice_end = start + period + 1;
                        end = slice_end;
                    }
                }
            }

            let window: String = chars[start..slice_end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }

            // Overlap-adjusted advance; the max() guard keeps the start
            // strictly increasing when the boundary cut ate the whole
            // advance distance.
            start = end.saturating_sub(overlap).max(start + 1);
        }
        chunks
    }

    /// Split one document's text into [`Chunk`]s tagged with the source id
    /// and their position in the sequence.
    #[must_use]
    pub fn segment_document(&self, source_document: &str, text: &str) -> Vec<Chunk> {
        self.segment(text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| Chunk::new(source_document, sequence_index, text))
            .collect()
    }
}
