//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Batched AI analysis constants
pub mod analysis {
    /// Files combined into one generation call
    pub const BATCH_SIZE: usize = 10;

    /// Per-file character budget inside a batch prompt
    pub const MAX_BATCH_FILE_CHARS: usize = 5_000;

    /// Response budget for a batch analysis call
    pub const BATCH_MAX_TOKENS: u32 = 4_000;

    /// Cap applied on interactive/cheap scan paths (full pipeline runs are uncapped)
    pub const INTERACTIVE_MAX_FILES: usize = 50;
}

/// Documentation builder constants
pub mod docs {
    /// Total files sampled into the generation prompt
    pub const MAX_SAMPLE_FILES: usize = 10;

    /// Character budget for README-like files
    pub const README_CHARS: usize = 2_000;

    /// Character budget for config files
    pub const CONFIG_CHARS: usize = 1_000;

    /// Character budget for entry-point files
    pub const ENTRY_CHARS: usize = 2_000;

    /// Character budget for remaining-slot files
    pub const FILL_CHARS: usize = 1_500;

    /// Config files sampled at most
    pub const MAX_CONFIG_FILES: usize = 3;

    /// Entry-point files sampled at most
    pub const MAX_ENTRY_FILES: usize = 3;

    /// Response budget for the documentation generation call
    pub const DOC_MAX_TOKENS: u32 = 6_000;

    /// Technologies listed in the statistics footer at most
    pub const MAX_FOOTER_TECHNOLOGIES: usize = 5;
}

/// Embedding and retrieval constants
pub mod embedding {
    /// Inputs longer than this are truncated before embedding
    pub const MAX_EMBED_CHARS: usize = 8_000;

    /// Default embedding vector dimension (text-embedding-3-small)
    pub const DIMENSION: usize = 1_536;

    /// Minimum content length for a chunk to be indexed
    pub const MIN_CHUNK_CHARS: usize = 50;

    /// Documentation chunk indices start here so they never collide
    /// with code-file chunk indices (which start at 0)
    pub const DOC_CHUNK_BASE: i64 = 1_000;

    /// Chunks retrieved per question
    pub const TOP_K: usize = 5;
}

/// Pipeline bookkeeping constants
pub mod pipeline {
    /// Progress stage labels are truncated to this length for storage
    pub const STAGE_LABEL_MAX: usize = 200;

    /// Captured error messages are truncated to this length
    pub const ERROR_MESSAGE_MAX: usize = 500;
}

/// File ingestion constants
pub mod ingest {
    /// Maximum file size read into a FileSet (1MB)
    pub const MAX_FILE_SIZE: u64 = 1_048_576;
}

/// Palette analysis constants
pub mod palette {
    /// Colors reported in a project palette
    pub const TOP_COLORS: usize = 5;
}

/// HTTP/Network constants
pub mod network {
    /// Generation request timeout; a large ceiling to tolerate slow generation
    pub const GENERATION_TIMEOUT_SECS: u64 = 1_800;

    /// Embedding request timeout
    pub const EMBEDDING_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Maximum transport-level retries for generation requests
    pub const MAX_GENERATION_RETRIES: usize = 3;

    /// Maximum transport-level retries for embedding requests
    pub const MAX_EMBEDDING_RETRIES: usize = 2;
}
