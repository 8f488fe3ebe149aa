//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for transport-level retry decisions.
//!
//! ## Design Principles
//!
//! - Single unified error type (ScopeError) for the entire application
//! - Category-based routing for retry decisions at the provider layer
//! - Errors never cross a pipeline stage boundary uncaught; the
//!   orchestrator converts them into status bookkeeping
//! - No panic/unwrap - all errors are recoverable

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ScopeError>;

// =============================================================================
// Error Categories
// =============================================================================

/// Transport error categories for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error - don't retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Network => write!(f, "NETWORK"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying at the transport layer
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Classify an HTTP status code
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            401 | 403 => Self::Auth,
            400 | 404 | 422 => Self::BadRequest,
            500 | 502 | 503 | 504 | 529 => Self::Transient,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ScopeError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // External Service Errors
    // -------------------------------------------------------------------------
    /// Generation service failure with retry-routing category
    #[error("Generation error [{category}]: {message}")]
    Generation {
        category: ErrorCategory,
        message: String,
    },

    /// Embedding service failure with retry-routing category
    #[error("Embedding error [{category}]: {message}")]
    Embedding {
        category: ErrorCategory,
        message: String,
    },

    /// Operation exceeded its deadline
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// A pipeline run is already in flight for this project.
    /// Starting a second run would corrupt progress fields and chunk indices.
    #[error("Project {0} is already being processed")]
    AlreadyProcessing(Uuid),

    #[error("Documentation not found for project {0}")]
    DocumentationNotFound(Uuid),
}

impl ScopeError {
    /// Build a generation error from an HTTP status and response body
    pub fn generation_http(status: u16, body: impl Into<String>) -> Self {
        Self::Generation {
            category: ErrorCategory::from_http_status(status),
            message: format!("HTTP {}: {}", status, body.into()),
        }
    }

    /// Build an embedding error from an HTTP status and response body
    pub fn embedding_http(status: u16, body: impl Into<String>) -> Self {
        Self::Embedding {
            category: ErrorCategory::from_http_status(status),
            message: format!("HTTP {}: {}", status, body.into()),
        }
    }

    /// Check if the error is worth retrying at the transport layer.
    ///
    /// Only provider clients consult this; the orchestrator treats any
    /// error that escapes a provider as terminal for the owning stage.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Generation { category, .. } | Self::Embedding { category, .. } => {
                category.is_retryable()
            }
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Truncate a message to a bounded length on a char boundary
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_string()
    } else {
        message.chars().take(max_chars).collect()
    }
}
