//! Prompt assembly and structured-output parsing

mod json;
mod prompt;

pub use json::{extract_json, parse_structured};
pub use prompt::PromptBuilder;
