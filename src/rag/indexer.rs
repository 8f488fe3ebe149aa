//! Retrieval Indexer
//!
//! Two producers feed one index: code files and documentation sections.
//! Their chunk indices occupy disjoint ranges (code from 0, documentation
//! from a fixed offset) so concurrent or repeated inserts can never
//! collide. Reindexing is always a full rebuild: delete everything, then
//! run both producers.

use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::SharedEmbedder;
use crate::constants::embedding as limits;
use crate::storage::ChunkStore;
use crate::types::{ChunkKind, DocSection, FileSet, NewChunk, Result};

pub struct RagIndexer {
    embedder: SharedEmbedder,
    chunks: ChunkStore,
}

impl RagIndexer {
    pub fn new(embedder: SharedEmbedder, chunks: ChunkStore) -> Self {
        Self { embedder, chunks }
    }

    /// Full rebuild of a project's retrieval index.
    ///
    /// Deletes all existing chunks, then indexes code files and
    /// documentation sections. Returns the total chunk count.
    pub async fn reindex(
        &self,
        project_id: Uuid,
        files: &FileSet,
        sections: &[DocSection],
    ) -> Result<usize> {
        let removed = self.chunks.delete_by_project(project_id)?;
        if removed > 0 {
            info!("Cleared {} existing chunks for project {}", removed, project_id);
        }

        let code_count = self.index_code_files(project_id, files).await?;
        let doc_count = self.index_documentation(project_id, sections).await?;

        let total = code_count + doc_count;
        info!(
            "Reindexed project {}: {} chunks ({} code, {} documentation)",
            project_id, total, code_count, doc_count
        );
        Ok(total)
    }

    /// Index code files with non-trivial content. Chunk indices start at 0.
    pub async fn index_code_files(&self, project_id: Uuid, files: &FileSet) -> Result<usize> {
        let mut chunk_index: i64 = 0;
        let mut count = 0;

        for (path, content) in files.iter() {
            if content.len() < limits::MIN_CHUNK_CHARS {
                continue;
            }

            let text = format!("File: {}\n\n{}", path, content);
            match self.embed_and_store(
                project_id,
                text,
                chunk_index,
                ChunkKind::CodeFile,
                None,
                Some(path.to_string()),
            ).await
            {
                Ok(()) => {
                    chunk_index += 1;
                    count += 1;
                }
                Err(e) => {
                    warn!("Failed to index file {}: {}", path, e);
                }
            }
        }

        Ok(count)
    }

    /// Index documentation sections with non-trivial content. Chunk
    /// indices start at the documentation offset, disjoint from code.
    pub async fn index_documentation(
        &self,
        project_id: Uuid,
        sections: &[DocSection],
    ) -> Result<usize> {
        let mut chunk_index: i64 = limits::DOC_CHUNK_BASE;
        let mut count = 0;

        for section in sections {
            if section.content.len() < limits::MIN_CHUNK_CHARS {
                continue;
            }

            let text = format!("Documentation - {}\n\n{}", section.title, section.content);
            match self.embed_and_store(
                project_id,
                text,
                chunk_index,
                ChunkKind::Documentation,
                Some(section.section_type.as_str().to_string()),
                Some(section.title.clone()),
            ).await
            {
                Ok(()) => {
                    chunk_index += 1;
                    count += 1;
                }
                Err(e) => {
                    warn!("Failed to index section '{}': {}", section.title, e);
                }
            }
        }

        Ok(count)
    }

    async fn embed_and_store(
        &self,
        project_id: Uuid,
        text: String,
        chunk_index: i64,
        kind: ChunkKind,
        section_type: Option<String>,
        section_title: Option<String>,
    ) -> Result<()> {
        let embedding = self.embedder.embed(&text).await?;
        self.chunks.insert(&NewChunk {
            project_id,
            token_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
            content: text,
            embedding,
            chunk_index,
            kind,
            section_type,
            section_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::EmbeddingClient;
    use crate::storage::{Database, ProjectStore};
    use crate::types::{ScopeError, SectionType, SourceKind};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Deterministic fake: embeds text as a tiny hash vector
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingClient for FakeEmbedder {
        async fn embed(&self, text: &str) -> crate::types::Result<Vec<f32>> {
            let sum: u32 = text.bytes().map(u32::from).sum();
            Ok(vec![(sum % 97) as f32, text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> crate::types::Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    /// Embedder that always fails
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingClient for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> crate::types::Result<Vec<f32>> {
            Err(ScopeError::Embedding {
                category: crate::types::ErrorCategory::Unknown,
                message: "down".to_string(),
            })
        }

        async fn embed_batch(&self, _texts: &[String]) -> crate::types::Result<Vec<Vec<f32>>> {
            Err(ScopeError::Embedding {
                category: crate::types::ErrorCategory::Unknown,
                message: "down".to_string(),
            })
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn setup(embedder: SharedEmbedder) -> (RagIndexer, ChunkStore, Uuid) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        let projects = ProjectStore::new(db.clone());
        let project = projects.create("demo", SourceKind::Upload).unwrap();
        (
            RagIndexer::new(embedder, ChunkStore::new(db.clone())),
            ChunkStore::new(db),
            project.id,
        )
    }

    fn long(text: &str) -> String {
        format!("{} {}", text, "filler ".repeat(20))
    }

    fn section(title: &str, content: String, order: usize) -> DocSection {
        DocSection {
            section_type: SectionType::from_title(title),
            title: title.to_string(),
            content,
            order,
        }
    }

    #[tokio::test]
    async fn test_chunk_index_ranges_are_disjoint() {
        let (indexer, chunks, project_id) = setup(Arc::new(FakeEmbedder));

        let files: FileSet = [
            ("a.py", long("a")),
            ("b.py", long("b")),
            ("c.py", long("c")),
        ]
        .into_iter()
        .collect();
        let sections = vec![
            section("Purpose and Objectives", long("purpose"), 0),
            section("Setup and Installation", long("setup"), 1),
        ];

        let total = indexer.reindex(project_id, &files, &sections).await.unwrap();
        assert_eq!(total, 5);

        let indices = chunks.chunk_indices(project_id).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 1000, 1001]);
    }

    #[tokio::test]
    async fn test_short_content_skipped() {
        let (indexer, chunks, project_id) = setup(Arc::new(FakeEmbedder));

        let files: FileSet = [("tiny.py", "x = 1".to_string()), ("big.py", long("code"))]
            .into_iter()
            .collect();
        let sections = vec![section("Purpose and Objectives", "too short".to_string(), 0)];

        let total = indexer.reindex(project_id, &files, &sections).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(chunks.chunk_indices(project_id).unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_reindex_twice_leaves_only_second_run() {
        let (indexer, chunks, project_id) = setup(Arc::new(FakeEmbedder));

        let files: FileSet = [("a.py", long("a")), ("b.py", long("b"))]
            .into_iter()
            .collect();
        indexer.reindex(project_id, &files, &[]).await.unwrap();

        let smaller: FileSet = [("a.py", long("a"))].into_iter().collect();
        let total = indexer.reindex(project_id, &smaller, &[]).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(chunks.count_by_project(project_id).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_per_chunk_failure_is_isolated() {
        let (indexer, chunks, project_id) = setup(Arc::new(BrokenEmbedder));

        let files: FileSet = [("a.py", long("a"))].into_iter().collect();
        let total = indexer.reindex(project_id, &files, &[]).await.unwrap();

        // Every embed failed, but reindex itself did not
        assert_eq!(total, 0);
        assert_eq!(chunks.count_by_project(project_id).unwrap(), 0);
    }
}
