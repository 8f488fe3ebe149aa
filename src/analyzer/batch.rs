//! Batch Analysis Client
//!
//! Shared call-and-parse cycle used by the security and quality scanners:
//! group files into fixed-size batches, send each batch as one combined
//! prompt, extract a JSON array from the response, and validate each
//! record. One external call per batch keeps call count proportional to
//! file count ÷ batch size.
//!
//! Failure policy: a failed call or unparseable response contributes zero
//! records for that batch only, never propagated to fail the whole scan.

use tracing::{debug, warn};

use crate::ai::{CompletionRequest, SharedGenerator, extract_json_array};
use crate::constants::analysis;

/// Truncate to a character budget on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render a batch of files into one combined prompt context.
///
/// Each file is truncated to the per-file character budget to bound token
/// cost.
pub fn build_batch_context(files: &[(String, String)], max_file_chars: usize) -> String {
    let mut context = String::new();
    for (path, content) in files {
        let body = truncate_chars(content, max_file_chars);
        context.push_str(&format!("\n\n### File: {}\n```\n{}\n```", path, body));
    }
    context
}

/// Shared batched analysis over a generation service
pub struct BatchAnalyzer {
    generator: SharedGenerator,
    batch_size: usize,
    max_file_chars: usize,
}

impl BatchAnalyzer {
    pub fn new(generator: SharedGenerator, batch_size: usize, max_file_chars: usize) -> Self {
        Self {
            generator,
            batch_size: batch_size.max(1),
            max_file_chars,
        }
    }

    /// Run the batched call-and-parse cycle over `files`.
    ///
    /// `prompt_for` turns a combined batch context into the full prompt;
    /// `validate` turns one response array element into a record or
    /// rejects it. Records from all batches are concatenated.
    pub async fn run<T>(
        &self,
        label: &str,
        files: &[(String, String)],
        system: &str,
        prompt_for: impl Fn(&str) -> String,
        validate: impl Fn(&serde_json::Value) -> Option<T>,
    ) -> Vec<T> {
        let mut records = Vec::new();
        let batch_count = files.len().div_ceil(self.batch_size);

        for (batch_idx, batch) in files.chunks(self.batch_size).enumerate() {
            debug!(
                "[{}] Batch {}/{}: analyzing {} files",
                label,
                batch_idx + 1,
                batch_count,
                batch.len()
            );

            let context = build_batch_context(batch, self.max_file_chars);
            let request = CompletionRequest::new(prompt_for(&context))
                .with_system(system)
                .with_max_tokens(analysis::BATCH_MAX_TOKENS);

            let response = match self.generator.complete(&request).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("[{}] Batch {} analysis failed: {}", label, batch_idx + 1, e);
                    continue;
                }
            };

            let parsed = extract_json_array(&response);
            let before = records.len();
            records.extend(parsed.iter().filter_map(&validate));
            debug!(
                "[{}] Batch {}: {} of {} records validated",
                label,
                batch_idx + 1,
                records.len() - before,
                parsed.len()
            );
        }

        records
    }
}
