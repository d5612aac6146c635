//! Grounding context assembly for the conversational layer.

use serde::Serialize;

use crate::index::RetrievalResult;

/// Retrieved snippets formatted for prompt inclusion.
///
/// Each snippet is rendered as `[From {source}]: {text}` and the snippets
/// are joined by blank lines, preserving retrieval order. The source tag is
/// the attribution surface the conversational component shows the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundingContext {
    text: String,
    results: Vec<RetrievalResult>,
}

impl GroundingContext {
    /// Assemble grounding text from ranked results.
    ///
    /// Returns `None` for an empty result set: "no grounding context" is a
    /// state the caller must handle, not an empty string to concatenate.
    #[must_use]
    pub fn from_results(results: Vec<RetrievalResult>) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let text = results
            .iter()
            .map(|result| format!("[From {}]: {}", result.metadata.source_document, result.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(Self { text, results })
    }

    /// The assembled grounding text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The contributing results, in retrieval order.
    #[must_use]
    pub fn results(&self) -> &[RetrievalResult] {
        &self.results
    }

    /// Consume the context, keeping only the assembled text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkMetadata;

    fn result(source: &str, seq: usize, text: &str, distance: f32) -> RetrievalResult {
        RetrievalResult {
            text: text.to_string(),
            metadata: ChunkMetadata::new(source, seq),
            distance,
        }
    }

    #[test]
    fn empty_results_yield_no_context() {
        assert_eq!(GroundingContext::from_results(Vec::new()), None);
    }

    #[test]
    fn snippets_are_tagged_and_joined_by_blank_lines() {
        let context = GroundingContext::from_results(vec![
            result("notes.txt", 0, "First passage.", 0.1),
            result("report.txt", 2, "Second passage.", 0.3),
        ])
        .unwrap();

        assert_eq!(
            context.text(),
            "[From notes.txt]: First passage.\n\n[From report.txt]: Second passage."
        );
        assert_eq!(context.results().len(), 2);
    }

    #[test]
    fn into_text_surrenders_the_assembled_string() {
        let context =
            GroundingContext::from_results(vec![result("notes.txt", 0, "Only passage.", 0.2)])
                .unwrap();
        assert_eq!(context.into_text(), "[From notes.txt]: Only passage.");
    }
}
