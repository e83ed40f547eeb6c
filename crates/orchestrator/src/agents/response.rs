use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::llm::{LlmError, LlmResult};

/// Decode a model response as JSON.
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or JSON surrounded by
/// prose (the outermost `{ … }` span is tried last).
pub fn parse_json_response(raw: &str) -> LlmResult<Value> {
    let trimmed = raw.trim();
    let first_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(fenced) = extract_fenced(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(LlmError::InvalidJson(first_error.to_string()))
}

static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("Invalid fence regex")
});

fn extract_fenced(text: &str) -> Option<&str> {
    let caps = FENCE_REGEX.captures(text)?;
    caps.get(1).map(|m| m.as_str().trim())
}
