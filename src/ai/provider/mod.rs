//! Text Generation Provider Abstraction
//!
//! Defines the TextGenerator trait the pipeline stages program against.
//! The service contract guarantees only best-effort natural-language or
//! near-JSON output; all prompt construction and response parsing is the
//! caller's responsibility.
//!
//! Transport-level retries (bounded, exponential backoff) live inside the
//! provider implementations; the orchestrator treats any error that
//! escapes a provider as terminal for the owning stage.

mod anthropic;
mod ollama;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::types::Result;

/// One generation request: prompt, optional system message, optional
/// max-token override
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Shared generator type for concurrent access across pipeline stages
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Text generation provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request, returning the raw text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared generator from configuration
pub fn create_generator(config: &GenerationConfig) -> Result<SharedGenerator> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(crate::types::ScopeError::Config(format!(
            "Unknown generation provider: {}. Supported: anthropic, ollama",
            config.provider
        ))),
    }
}
