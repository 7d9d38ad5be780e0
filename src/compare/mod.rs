//! LLM-backed pairwise document comparison

use std::sync::Arc;

use crate::analysis::truncate_at_boundary;
use crate::config::LlmConfig;
use crate::error::Result;
use crate::generation::{parse_structured, PromptBuilder};
use crate::ingestion::ParsedDocument;
use crate::providers::LlmProvider;
use crate::types::ComparisonRow;

const COMPARE_SCHEMA_HINT: &str = r#"[{"Page": "1", "Changes": "..."}]"#;

/// Compares a reference document against an updated version, page by page
pub struct DocumentComparator {
    llm: Arc<dyn LlmProvider>,
    max_chars: usize,
}

impl DocumentComparator {
    /// Create a comparator over an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            llm,
            max_chars: config.max_analysis_chars,
        }
    }

    /// Flatten both documents into one prompt payload, tagging each page so
    /// the model can report changes per page
    pub fn combine(reference: &ParsedDocument, actual: &ParsedDocument) -> String {
        let mut combined = String::new();
        combined.push_str("=== REFERENCE DOCUMENT ===\n\n");
        append_pages(&mut combined, reference);
        combined.push_str("\n=== UPDATED DOCUMENT ===\n\n");
        append_pages(&mut combined, actual);
        combined
    }

    /// Compare the combined documents into page-wise change rows.
    ///
    /// "NO CHANGE" rows are kept so the caller sees every page accounted
    /// for. Malformed model output gets one repair attempt.
    pub async fn compare(&self, combined: &str) -> Result<Vec<ComparisonRow>> {
        let combined = truncate_at_boundary(combined, self.max_chars);
        let prompt = PromptBuilder::build_compare_prompt(combined);
        let raw = self.llm.complete(&prompt).await?;

        match parse_structured::<Vec<ComparisonRow>>(&raw) {
            Ok(rows) => Ok(rows),
            Err(parse_err) => {
                tracing::warn!("Comparison output unparseable, attempting repair: {}", parse_err);
                let repair = PromptBuilder::build_repair_prompt(
                    COMPARE_SCHEMA_HINT,
                    &parse_err.to_string(),
                    &raw,
                );
                let repaired = self.llm.complete(&repair).await?;
                parse_structured(&repaired)
            }
        }
    }
}

fn append_pages(out: &mut String, doc: &ParsedDocument) {
    for page in &doc.pages {
        out.push_str(&format!("--- Page {} ---\n", page.page_number));
        out.push_str(&page.content);
        out.push('\n');
    }
}
