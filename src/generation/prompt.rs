//! Prompt templates for retrieval, analysis, and comparison

use crate::index::ScoredChunk;
use crate::types::ChatTurn;

/// Prompt builder for all LLM-backed operations
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build a numbered context block from retrieved chunks
    pub fn build_context(results: &[ScoredChunk]) -> String {
        let mut context = String::new();
        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\n{}\n\n---\n\n",
                i + 1,
                result.chunk.source.format_citation(),
                result.chunk.content
            ));
        }
        context
    }

    /// Build the grounded question-answering prompt
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are an assistant that answers questions using ONLY the provided document context.

RULES:
1. Use only information explicitly stated in the context below.
2. If the answer is not in the context, reply exactly: "This information is not available in the provided documents."
3. Do not use outside knowledge or make inferences beyond the text.
4. When a fact comes from a numbered source, mention it as [n].

CONTEXT:
{context}

QUESTION: {question}

ANSWER:"#
        )
    }

    /// Build the prompt that rewrites a follow-up question into a standalone
    /// one, given prior conversation turns
    pub fn build_contextualize_prompt(question: &str, history: &[ChatTurn]) -> String {
        let turns: Vec<String> = history
            .iter()
            .map(|t| format!("User: {}\nAssistant: {}", t.question, t.answer))
            .collect();
        format!(
            r#"Given the conversation below, rewrite the final user question so it can be understood without the conversation. Do not answer it; return only the rewritten question.

CONVERSATION:
{}

FINAL QUESTION: {}

STANDALONE QUESTION:"#,
            turns.join("\n\n"),
            question
        )
    }

    /// Build the document-analysis prompt requesting strict JSON output
    pub fn build_analysis_prompt(text: &str) -> String {
        format!(
            r#"You are a highly capable assistant trained to analyze and summarize documents.
Return ONLY a JSON object matching this exact schema, with no extra text:

{{
  "summary": ["point 1", "point 2"],
  "title": "...",
  "author": "...",
  "date_created": "...",
  "last_modified_date": "...",
  "publisher": "...",
  "language": "...",
  "page_count": "...",
  "sentiment_tone": "..."
}}

Use "Not Available" for any field that cannot be determined from the document.

DOCUMENT:
{text}
"#
        )
    }

    /// Build the document-comparison prompt requesting page-wise rows
    pub fn build_compare_prompt(combined: &str) -> String {
        format!(
            r#"You will compare two documents and report the differences page by page.
The first document is the reference; the second is the updated version.

Return ONLY a JSON array matching this exact schema, with no extra text:

[
  {{"Page": "1", "Changes": "description of the change"}},
  {{"Page": "2", "Changes": "NO CHANGE"}}
]

Report every page of the reference document. Use "NO CHANGE" when a page is identical.

DOCUMENTS:
{combined}
"#
        )
    }

    /// Build the prompt used to repair malformed structured output
    pub fn build_repair_prompt(schema_hint: &str, parse_error: &str, malformed: &str) -> String {
        format!(
            r#"Your previous output could not be parsed: {parse_error}

Return ONLY valid JSON matching this schema, with no commentary or code fences:
{schema_hint}

PREVIOUS OUTPUT:
{malformed}
"#
        )
    }
}
