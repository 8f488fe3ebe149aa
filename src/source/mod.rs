//! Source Acquisition
//!
//! Turns a source reference (today: a local directory) into the FileSet
//! the pipeline consumes. A repository-cloning client plugs in through
//! the same trait and the pipeline treats its output identically to an
//! upload.

pub mod local;

pub use local::load_dir;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::types::{FileSet, Result};

/// External source-fetch contract: resolve a reference (repository URL,
/// directory path) at a branch into a flat FileSet.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, reference: &str, branch: Option<&str>) -> Result<FileSet>;
}

/// Fetcher for local directories; the upload path's equivalent for the CLI.
pub struct LocalDirFetcher;

#[async_trait]
impl SourceFetcher for LocalDirFetcher {
    async fn fetch(&self, reference: &str, _branch: Option<&str>) -> Result<FileSet> {
        let root = PathBuf::from(reference);
        // Directory walking is blocking; hand it to the blocking pool
        tokio::task::spawn_blocking(move || load_dir(&root))
            .await
            .map_err(|e| crate::types::ScopeError::Storage(format!("fetch task failed: {}", e)))?
    }
}
