//! Ollama Provider
//!
//! Local LLM backend via Ollama's generate endpoint. Useful for running
//! the pipeline without API credentials.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::constants::network;
use crate::types::{Result, ScopeError};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1";

pub struct OllamaProvider {
    api_base: String,
    model: String,
    default_max_tokens: u32,
    max_retries: usize,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: GenerationConfig) -> Result<Self> {
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
            api_base,
            model,
            default_max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String> {
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens.unwrap_or(self.default_max_tokens),
            },
        };

        let url = format!("{}/api/generate", self.api_base);
        debug!("Sending request to Ollama (model: {})", self.model);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScopeError::generation_http(status, body));
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl TextGenerator for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (|| self.send_once(request))
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(|e: &ScopeError| e.is_retryable())
            .notify(|e: &ScopeError, dur: Duration| {
                warn!("Ollama request failed, retrying in {:?}: {}", dur, e);
            })
            .await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
