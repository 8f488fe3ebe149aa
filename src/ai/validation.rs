//! JSON Array Extraction from LLM Responses
//!
//! Generative models wrap JSON in prose and fenced code blocks
//! non-deterministically. This module extracts a single well-formed JSON
//! array from that noise.
//!
//! Extraction order:
//! 1. Strip leading/trailing whitespace
//! 2. If a fenced block tagged `json` exists, take its body
//! 3. Else if any fenced block exists, take its body (skipping a short
//!    language-tag line)
//! 4. Slice from the first `[` to the last `]` inclusive
//! 5. Parse; a non-array top level is discarded with a logged warning
//!
//! A parse failure is never an error: it yields zero records, bounding the
//! blast radius of a malformed response to one call.

use serde_json::Value;
use tracing::{debug, warn};

/// Maximum length of a fence language-tag line worth skipping
const MAX_LANG_TAG_LEN: usize = 20;

/// Extract a JSON array from a model response.
///
/// Returns the array elements, or an empty vec if no parseable array is
/// present. Never fails.
pub fn extract_json_array(raw: &str) -> Vec<Value> {
    let mut text = raw.trim().to_string();

    if let Some(body) = fenced_block_body(&text) {
        text = body;
    }

    // Narrow to the outermost array
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']'))
        && start < end
    {
        text = text[start..=end].to_string();
    }

    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Array(items)) => {
            debug!("Parsed {} records from response", items.len());
            items
        }
        Ok(other) => {
            warn!(
                "Expected a JSON array, got {}; discarding response",
                type_name(&other)
            );
            Vec::new()
        }
        Err(e) => {
            warn!(
                "Failed to parse JSON from response: {} (preview: {:?})",
                e,
                raw.chars().take(200).collect::<String>()
            );
            Vec::new()
        }
    }
}

/// Extract the body of a fenced code block, preferring a ```json fence.
fn fenced_block_body(text: &str) -> Option<String> {
    let lower = text.to_lowercase();

    // Lowercasing can change byte offsets for some scripts; only trust the
    // case-insensitive search when lengths agree
    if lower.len() == text.len()
        && let Some(marker) = lower.find("```json")
        && let Some(newline) = text[marker..].find('\n')
    {
        // Body starts after the fence line
        let body = &text[marker + newline + 1..];
        let body_end = body.find("```").unwrap_or(body.len());
        return Some(body[..body_end].trim().to_string());
    }

    if let Some(marker) = text.find("```") {
        let mut start = marker + 3;
        // Skip a language identifier line if present and short
        if let Some(newline) = text[start..].find('\n')
            && newline < MAX_LANG_TAG_LEN
        {
            start += newline + 1;
        }
        let body = &text[start..];
        let body_end = body.find("```").unwrap_or(body.len());
        return Some(body[..body_end].trim().to_string());
    }

    None
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
