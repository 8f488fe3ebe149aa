//! Embedding chunk persistence and similarity queries
//!
//! Vectors are stored as little-endian f32 BLOBs. Similarity ranking
//! decodes a project's chunks and scores them in-process; per-project
//! chunk counts are small enough that this beats maintaining a vector
//! index.

use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use super::database::SharedDatabase;
use crate::types::{ChunkKind, ChunkMatch, NewChunk, Result, ScopeError};

pub struct ChunkStore {
    db: SharedDatabase,
}

impl ChunkStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    pub fn insert(&self, chunk: &NewChunk) -> Result<()> {
        self.db.execute(
            "INSERT INTO document_chunks
             (project_id, content, embedding, chunk_index, kind, section_type, section_title,
              token_count, char_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            &[
                &chunk.project_id.to_string(),
                &chunk.content,
                &vec_to_blob(&chunk.embedding),
                &chunk.chunk_index,
                &chunk.kind.as_str(),
                &chunk.section_type,
                &chunk.section_title,
                &(chunk.token_count as i64),
                &(chunk.char_count as i64),
                &Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Delete all chunks for a project, returning the count removed.
    pub fn delete_by_project(&self, project_id: Uuid) -> Result<usize> {
        self.db.execute(
            "DELETE FROM document_chunks WHERE project_id = ?1",
            &[&project_id.to_string()],
        )
    }

    pub fn count_by_project(&self, project_id: Uuid) -> Result<usize> {
        let conn = self.db.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM document_chunks WHERE project_id = ?1",
            [project_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }

    /// All chunk indices for a project, ascending. Used by tests and
    /// diagnostics to verify index-range disjointness.
    pub fn chunk_indices(&self, project_id: Uuid) -> Result<Vec<i64>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT chunk_index FROM document_chunks WHERE project_id = ?1 ORDER BY chunk_index",
        )?;
        let rows = stmt.query_map([project_id.to_string()], |row| row.get(0))?;
        rows.map(|r| r.map_err(ScopeError::from)).collect()
    }

    /// Top-k chunks for a project by cosine similarity to the query vector.
    pub fn nearest(&self, project_id: Uuid, query: &[f32], k: usize) -> Result<Vec<ChunkMatch>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT content, embedding, chunk_index, kind, section_type, section_title
             FROM document_chunks WHERE project_id = ?1",
        )?;

        let rows = stmt.query_map([project_id.to_string()], |row| {
            let blob: Vec<u8> = row.get("embedding")?;
            Ok((row_to_match(row)?, blob))
        })?;

        let mut matches: Vec<ChunkMatch> = Vec::new();
        for row in rows {
            let (mut chunk_match, blob) = row?;
            let embedding = blob_to_vec(&blob);
            chunk_match.similarity = cosine_similarity(query, &embedding);
            matches.push(chunk_match);
        }

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }
}

fn row_to_match(row: &Row<'_>) -> rusqlite::Result<ChunkMatch> {
    let kind: String = row.get("kind")?;
    Ok(ChunkMatch {
        chunk_index: row.get("chunk_index")?,
        content: row.get("content")?,
        kind: ChunkKind::parse(&kind).unwrap_or(ChunkKind::CodeFile),
        section_type: row.get("section_type")?,
        section_title: row.get("section_title")?,
        similarity: 0.0,
    })
}

/// Encode a float vector as little-endian bytes for BLOB storage
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors, in [-1.0, 1.0].
///
/// Returns 0.0 for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
