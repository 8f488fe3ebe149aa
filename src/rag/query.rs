//! Retrieval-Augmented Question Answering
//!
//! Embed the question once, retrieve the top-k most similar chunks, and
//! answer with one generation call grounded in the retrieved context.

use tracing::info;
use uuid::Uuid;

use crate::ai::{CompletionRequest, SharedEmbedder, SharedGenerator};
use crate::storage::ChunkStore;
use crate::types::Result;

const SYSTEM_MESSAGE: &str =
    "You are a helpful AI assistant that answers questions about code. Be accurate and concise.";

/// Returned when the project has no indexed chunks to ground an answer
pub const INSUFFICIENT_CONTEXT_MESSAGE: &str = "I don't have enough context about this project \
    to answer your question. Please make sure the project has been processed and documentation \
    has been generated.";

/// An answer with its de-duplicated source labels
#[derive(Debug, Clone)]
pub struct Answer {
    pub message: String,
    pub sources: Vec<String>,
}

pub struct RagQuery {
    embedder: SharedEmbedder,
    generator: SharedGenerator,
    chunks: ChunkStore,
    top_k: usize,
}

impl RagQuery {
    pub fn new(
        embedder: SharedEmbedder,
        generator: SharedGenerator,
        chunks: ChunkStore,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            chunks,
            top_k,
        }
    }

    /// Answer a free-text question about a project.
    pub async fn answer(&self, project_id: Uuid, question: &str) -> Result<Answer> {
        let query_vector = self.embedder.embed(question).await?;
        let matches = self.chunks.nearest(project_id, &query_vector, self.top_k)?;

        if matches.is_empty() {
            return Ok(Answer {
                message: INSUFFICIENT_CONTEXT_MESSAGE.to_string(),
                sources: Vec::new(),
            });
        }

        info!(
            "Answering question for project {} from {} retrieved chunks",
            project_id,
            matches.len()
        );

        let mut context_parts = Vec::new();
        let mut sources = Vec::new();
        for chunk in &matches {
            context_parts.push(format!(
                "--- Content (similarity: {:.2}) ---\n{}\n",
                chunk.similarity, chunk.content
            ));
            if let Some(label) = chunk.source_label()
                && !sources.contains(&label)
            {
                sources.push(label);
            }
        }
        let context = context_parts.join("\n");

        let request = CompletionRequest::new(answer_prompt(question, &context))
            .with_system(SYSTEM_MESSAGE);
        let message = self.generator.complete(&request).await?;

        Ok(Answer { message, sources })
    }
}

fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        r#"Answer the following question based on the provided context.

Context:
{context}

Question: {question}

Please provide a clear, detailed answer based solely on the provided context."#
    )
}
