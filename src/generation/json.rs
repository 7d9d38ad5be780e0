//! Extraction of JSON payloads from LLM output
//!
//! Models are asked for bare JSON but frequently wrap it in code fences or
//! surround it with prose. These helpers locate the payload before parsing.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Strip code fences and surrounding prose, returning the JSON slice
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    // ```json ... ``` or ``` ... ```
    let inner = if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.trim_start_matches(['\r', '\n']);
        rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest)
    } else {
        trimmed
    };
    let inner = inner.trim();

    // Locate the outermost object or array when prose surrounds it
    let open = inner.find(['{', '[']);
    let close = inner.rfind(['}', ']']);
    match (open, close) {
        (Some(start), Some(end)) if start < end => &inner[start..=end],
        _ => inner,
    }
}

/// Parse LLM output into a structured value, tolerating fences and prose
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let payload = extract_json(raw);
    serde_json::from_str(payload)
        .map_err(|e| Error::LlmOutput(format!("invalid structured output: {e}")))
}
