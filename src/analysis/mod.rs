//! LLM-backed document metadata extraction

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::generation::{parse_structured, PromptBuilder};
use crate::providers::LlmProvider;
use crate::types::DocumentMetadata;

const ANALYSIS_SCHEMA_HINT: &str = r#"{"summary": [...], "title": "...", "author": "...", "date_created": "...", "last_modified_date": "...", "publisher": "...", "language": "...", "page_count": "...", "sentiment_tone": "..."}"#;

/// Extracts structured metadata from a document via the LLM
pub struct DocumentAnalyzer {
    llm: Arc<dyn LlmProvider>,
    max_chars: usize,
}

impl DocumentAnalyzer {
    /// Create an analyzer over an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            llm,
            max_chars: config.max_analysis_chars,
        }
    }

    /// Analyze document text into structured metadata.
    ///
    /// Oversized documents are truncated to the configured limit before
    /// prompting. Malformed model output gets exactly one repair attempt;
    /// a second failure surfaces as an error.
    pub async fn analyze(&self, text: &str) -> Result<DocumentMetadata> {
        let text = truncate_at_boundary(text, self.max_chars);
        let prompt = PromptBuilder::build_analysis_prompt(text);
        let raw = self.llm.complete(&prompt).await?;

        match parse_structured::<DocumentMetadata>(&raw) {
            Ok(metadata) => Ok(metadata),
            Err(parse_err) => {
                tracing::warn!("Analysis output unparseable, attempting repair: {}", parse_err);
                let repair = PromptBuilder::build_repair_prompt(
                    ANALYSIS_SCHEMA_HINT,
                    &parse_err.to_string(),
                    &raw,
                );
                let repaired = self.llm.complete(&repair).await?;
                parse_structured(&repaired)
            }
        }
    }
}

/// Truncate to at most `max_chars` bytes without splitting a character
pub(crate) fn truncate_at_boundary(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedLlm {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            self.replies
                .lock()
                .pop()
                .ok_or_else(|| Error::Llm("no scripted reply left".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    const VALID: &str = r#"{"summary": ["A report."], "title": "Q3 Report", "author": "Jane", "date_created": "2024-01-01", "last_modified_date": "Not Available", "publisher": "Not Available", "language": "English", "page_count": "12", "sentiment_tone": "Neutral"}"#;

    #[tokio::test]
    async fn parses_valid_output() {
        let llm = Arc::new(ScriptedLlm::new(vec![VALID]));
        let analyzer = DocumentAnalyzer::new(llm, &LlmConfig::default());

        let metadata = analyzer.analyze("Quarterly report text.").await.unwrap();
        assert_eq!(metadata.title, "Q3 Report");
        assert_eq!(metadata.summary, vec!["A report.".to_string()]);
    }

    #[tokio::test]
    async fn repairs_malformed_output_once() {
        let llm = Arc::new(ScriptedLlm::new(vec!["Sure! Here you go: oops", VALID]));
        let analyzer = DocumentAnalyzer::new(llm.clone(), &LlmConfig::default());

        let metadata = analyzer.analyze("Some text.").await.unwrap();
        assert_eq!(metadata.title, "Q3 Report");
        assert_eq!(llm.prompts.lock().len(), 2);
        assert!(llm.prompts.lock()[1].contains("could not be parsed"));
    }

    #[tokio::test]
    async fn second_failure_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new(vec!["garbage", "still garbage"]));
        let analyzer = DocumentAnalyzer::new(llm, &LlmConfig::default());

        let err = analyzer.analyze("Some text.").await.unwrap_err();
        assert!(matches!(err, Error::LlmOutput(_)));
    }

    #[tokio::test]
    async fn missing_fields_default_to_not_available() {
        let llm = Arc::new(ScriptedLlm::new(vec![r#"{"summary": [], "title": "Only Title"}"#]));
        let analyzer = DocumentAnalyzer::new(llm, &LlmConfig::default());

        let metadata = analyzer.analyze("text").await.unwrap();
        assert_eq!(metadata.title, "Only Title");
        assert_eq!(metadata.author, "Not Available");
        assert_eq!(metadata.sentiment_tone, "Not Available");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_at_boundary(text, 2);
        assert_eq!(cut, "h");
        assert_eq!(truncate_at_boundary("short", 100), "short");
    }
}
