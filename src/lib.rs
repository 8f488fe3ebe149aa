//! codescope - AI-Driven Codebase Analysis and Documentation Pipeline
//!
//! Ingests a source-code project and pipelines it through asynchronous
//! analysis stages: structural analysis, AI-generated documentation, a
//! security-vulnerability scan, a code-quality review, and a retrieval
//! index for chat-style questions. Results are persisted in SQLite and
//! observable through a polling status record while the heavy stages run
//! in the background.
//!
//! ## Pipeline
//!
//! ```text
//! submit → structure (10%) → palette (20%) → documentation (40%)
//!        → checkpoint: completed (100%)
//!        → security scan → quality scan → retrieval indexing
//! ```
//!
//! Once documentation exists the project is externally `completed`; the
//! three background stages are best-effort enrichment and their failure
//! never reverts that.
//!
//! ## Modules
//!
//! - [`ai`]: generation/embedding providers and response parsing
//! - [`analyzer`]: structural analysis and the batched AI scanners
//! - [`docs`]: documentation generation and section splitting
//! - [`rag`]: retrieval index and question answering
//! - [`pipeline`]: the stage orchestrator
//! - [`storage`]: SQLite persistence and the object store
//! - [`source`]: loading FileSets from disk or a fetcher

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod pipeline;
pub mod rag;
pub mod source;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{Result, ScopeError};

// Data Model
pub use types::{
    CodeImprovement, DocSection, Documentation, FileSet, Project, ProjectStatus, SecurityFinding,
    SourceKind,
};

// Pipeline
pub use pipeline::{PipelineRunner, PipelineStage};

// Storage
pub use storage::{Database, SharedDatabase};

// AI
pub use ai::{
    CompletionRequest, EmbeddingClient, SharedEmbedder, SharedGenerator, TextGenerator,
    create_generator,
};
