//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/codescope/) and project (.codescope/)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{analysis, embedding, network};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage locations
    pub storage: StorageConfig,

    /// Text generation provider settings
    pub generation: GenerationConfig,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Batched scan settings
    pub scan: ScanConfig,

    /// Retrieval settings
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ScopeError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.scan.batch_size == 0 {
            return Err(crate::types::ScopeError::Config(
                "scan.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.generation.timeout_secs == 0 {
            return Err(crate::types::ScopeError::Config(
                "generation.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(crate::types::ScopeError::Config(
                "embedding.dimension must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(crate::types::ScopeError::Config(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path
    pub db_path: PathBuf,

    /// Root directory of the local object store
    pub object_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".codescope/codescope.db"),
            object_root: PathBuf::from(".codescope/objects"),
        }
    }
}

// =============================================================================
// Generation Provider Configuration
// =============================================================================

/// Configuration for the text generation provider
///
/// Note: API keys are never serialized to output and are redacted in
/// debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider type: "anthropic", "ollama"
    pub provider: String,
    /// Model name (provider-specific); None uses the provider default
    pub model: Option<String>,
    /// API key; usually supplied via ANTHROPIC_API_KEY or
    /// CODESCOPE_GENERATION__API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum tokens to generate when the caller does not override
    pub max_tokens: u32,
    /// Transport-level retry attempts for retryable failures
    pub max_retries: usize,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: None,
            api_key: None,
            api_base: None,
            timeout_secs: network::GENERATION_TIMEOUT_SECS,
            max_tokens: 4_096,
            max_retries: network::MAX_GENERATION_RETRIES,
        }
    }
}

// =============================================================================
// Embedding Provider Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// API key; usually supplied via OPENAI_API_KEY or
    /// CODESCOPE_EMBEDDING__API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub api_base: Option<String>,
    /// Embedding vector dimension
    pub dimension: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Transport-level retry attempts
    pub max_retries: usize,
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("dimension", &self.dimension)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            api_base: None,
            dimension: embedding::DIMENSION,
            timeout_secs: network::EMBEDDING_TIMEOUT_SECS,
            max_retries: network::MAX_EMBEDDING_RETRIES,
        }
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files combined into one generation call
    pub batch_size: usize,

    /// Per-file character budget inside a batch prompt
    pub max_file_chars: usize,

    /// File cap for interactive/cheap scan paths.
    /// Full pipeline runs are uncapped.
    pub interactive_max_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: analysis::BATCH_SIZE,
            max_file_chars: analysis::MAX_BATCH_FILE_CHARS,
            interactive_max_files: analysis::INTERACTIVE_MAX_FILES,
        }
    }
}

// =============================================================================
// Retrieval Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: embedding::TOP_K,
        }
    }
}
