//! Embedding chunk types for the retrieval index

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of source text a chunk was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    CodeFile,
    Documentation,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeFile => "code_file",
            Self::Documentation => "documentation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "code_file" => Some(Self::CodeFile),
            "documentation" => Some(Self::Documentation),
            _ => None,
        }
    }
}

/// A chunk ready for insertion: source text, vector, and metadata.
///
/// Chunk indices are unique per project: code-file chunks count up from 0,
/// documentation chunks from a fixed offset, so the two producers can never
/// collide.
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub project_id: Uuid,
    pub content: String,
    pub embedding: Vec<f32>,
    pub chunk_index: i64,
    pub kind: ChunkKind,
    /// Section type for documentation chunks; None for code chunks
    pub section_type: Option<String>,
    /// Section title for documentation chunks, filename for code chunks
    pub section_title: Option<String>,
    pub token_count: usize,
    pub char_count: usize,
}

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub chunk_index: i64,
    pub content: String,
    pub kind: ChunkKind,
    pub section_type: Option<String>,
    pub section_title: Option<String>,
    /// Cosine similarity in [-1.0, 1.0], higher is closer
    pub similarity: f32,
}

impl ChunkMatch {
    /// Human-readable source label for chat answers.
    ///
    /// Documentation chunks are labeled by section title (falling back to
    /// section type); code chunks by filename.
    pub fn source_label(&self) -> Option<String> {
        match self.kind {
            ChunkKind::Documentation => self
                .section_title
                .as_deref()
                .filter(|t| !t.is_empty())
                .or(self.section_type.as_deref().filter(|t| !t.is_empty()))
                .map(|t| format!("Documentation: {}", t)),
            ChunkKind::CodeFile => self
                .section_title
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| format!("Code: {}", t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_match(title: Option<&str>, ty: Option<&str>) -> ChunkMatch {
        ChunkMatch {
            chunk_index: 1000,
            content: String::new(),
            kind: ChunkKind::Documentation,
            section_type: ty.map(str::to_string),
            section_title: title.map(str::to_string),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_doc_source_label_prefers_title() {
        let m = doc_match(Some("Setup and Installation"), Some("setup"));
        assert_eq!(
            m.source_label(),
            Some("Documentation: Setup and Installation".to_string())
        );
    }

    #[test]
    fn test_doc_source_label_falls_back_to_type() {
        let m = doc_match(None, Some("setup"));
        assert_eq!(m.source_label(), Some("Documentation: setup".to_string()));
    }

    #[test]
    fn test_code_source_label_uses_filename() {
        let m = ChunkMatch {
            chunk_index: 0,
            content: String::new(),
            kind: ChunkKind::CodeFile,
            section_type: None,
            section_title: Some("src/main.py".to_string()),
            similarity: 0.5,
        };
        assert_eq!(m.source_label(), Some("Code: src/main.py".to_string()));
    }
}
