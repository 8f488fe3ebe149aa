//! Anthropic Messages API Provider

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::constants::network;
use crate::types::{Result, ScopeError};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API provider with secure API key handling
pub struct AnthropicProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    default_max_tokens: u32,
    max_retries: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("default_max_tokens", &self.default_max_tokens)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                ScopeError::Config(
                    "Anthropic API key not found. Set ANTHROPIC_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(ScopeError::Http)?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            default_max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            system: request.system.clone(),
        };

        let url = format!("{}/v1/messages", self.api_base);
        debug!("Sending request to Anthropic API (model: {})", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScopeError::generation_http(status, body));
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ScopeError::Generation {
                category: crate::types::ErrorCategory::Unknown,
                message: "No text content in Anthropic response".to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (|| self.send_once(request))
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(|e: &ScopeError| e.is_retryable())
            .notify(|e: &ScopeError, dur: Duration| {
                warn!("Anthropic request failed, retrying in {:?}: {}", dur, e);
            })
            .await
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
