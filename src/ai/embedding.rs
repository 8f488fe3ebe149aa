//! Embedding Provider
//!
//! Converts text into fixed-dimension vectors for the retrieval index.
//! Inputs longer than a fixed character budget are truncated before
//! sending; empty inputs are rejected.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::constants::{embedding as limits, network};
use crate::types::{ErrorCategory, Result, ScopeError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Shared embedder type for concurrent access
pub type SharedEmbedder = Arc<dyn EmbeddingClient>;

/// Embedding provider
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed one text into a fixed-length vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts in one call, preserving order.
    /// Empty texts are filtered out before sending.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Vector dimension this client produces
    fn dimension(&self) -> usize;
}

/// Truncate text to the embedding character budget on a char boundary
pub fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(limits::MAX_EMBED_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// OpenAI embeddings API client
pub struct OpenAiEmbeddings {
    api_key: SecretString,
    api_base: String,
    model: String,
    dimension: usize,
    max_retries: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddings")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl OpenAiEmbeddings {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                ScopeError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(ScopeError::Http)?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model: config.model,
            dimension: config.dimension,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn request_embeddings(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingsRequest {
            model: self.model.clone(),
            input: inputs,
        };

        let url = format!("{}/embeddings", self.api_base);
        debug!(
            "Requesting {} embedding(s) from OpenAI (model: {})",
            body.input.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScopeError::embedding_http(status, body));
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        let mut data = parsed.data;
        // Responses may arrive out of order; index restores input order
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    async fn request_with_retry(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        (|| self.request_embeddings(inputs.clone()))
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(|e: &ScopeError| e.is_retryable())
            .notify(|e: &ScopeError, dur: Duration| {
                warn!("Embedding request failed, retrying in {:?}: {}", dur, e);
            })
            .await
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let cleaned = truncate_for_embedding(text.trim());
        if cleaned.is_empty() {
            return Err(ScopeError::Embedding {
                category: ErrorCategory::BadRequest,
                message: "Empty text provided for embedding".to_string(),
            });
        }

        let mut vectors = self.request_with_retry(vec![cleaned.to_string()]).await?;
        vectors.pop().ok_or_else(|| ScopeError::Embedding {
            category: ErrorCategory::Unknown,
            message: "Empty embedding response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let cleaned: Vec<String> = texts
            .iter()
            .map(|t| truncate_for_embedding(t.trim()).to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        self.request_with_retry(cleaned).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_for_embedding("hello"), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "x".repeat(limits::MAX_EMBED_CHARS + 100);
        assert_eq!(
            truncate_for_embedding(&long).chars().count(),
            limits::MAX_EMBED_CHARS
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long: String = "é".repeat(limits::MAX_EMBED_CHARS + 10);
        let truncated = truncate_for_embedding(&long);
        assert_eq!(truncated.chars().count(), limits::MAX_EMBED_CHARS);
    }
}
