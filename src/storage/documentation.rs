//! Documentation persistence
//!
//! One current documentation row per project. The pipeline creates it;
//! manual edits re-split sections and bump the version.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use super::database::SharedDatabase;
use crate::docs::{split_sections, word_count};
use crate::types::{DocSection, Documentation, Result, ScopeError};

pub struct DocumentationStore {
    db: SharedDatabase,
}

impl DocumentationStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Store generated documentation for a project.
    ///
    /// A re-run replaces the existing row and bumps its version.
    pub fn create(
        &self,
        project_id: Uuid,
        markdown: &str,
        sections: &[DocSection],
        word_count: usize,
        generation_secs: Option<i64>,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let sections_json = serde_json::to_string(sections)?;

        self.db.execute(
            "INSERT INTO documentation (project_id, markdown, sections, word_count, generation_secs, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             ON CONFLICT (project_id) DO UPDATE SET
                 markdown = excluded.markdown,
                 sections = excluded.sections,
                 word_count = excluded.word_count,
                 generation_secs = excluded.generation_secs,
                 version = version + 1,
                 updated_at = excluded.updated_at",
            &[
                &project_id.to_string(),
                &markdown,
                &sections_json,
                &(word_count as i64),
                &generation_secs,
                &now,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_project(&self, project_id: Uuid) -> Result<Option<Documentation>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM documentation WHERE project_id = ?1")?;
        let mut rows = stmt.query_map([project_id.to_string()], row_to_documentation)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Apply a manual edit: re-split sections, recompute the word count,
    /// and bump the version.
    pub fn update(&self, project_id: Uuid, markdown: &str) -> Result<Documentation> {
        let sections = split_sections(markdown);
        let sections_json = serde_json::to_string(&sections)?;
        let words = word_count(markdown);
        let now = Utc::now().to_rfc3339();

        let updated = self.db.execute(
            "UPDATE documentation
             SET markdown = ?2, sections = ?3, word_count = ?4,
                 version = version + 1, updated_at = ?5
             WHERE project_id = ?1",
            &[
                &project_id.to_string(),
                &markdown,
                &sections_json,
                &(words as i64),
                &now,
            ],
        )?;

        if updated == 0 {
            return Err(ScopeError::DocumentationNotFound(project_id));
        }

        self.find_by_project(project_id)?
            .ok_or(ScopeError::DocumentationNotFound(project_id))
    }
}

fn row_to_documentation(row: &Row<'_>) -> rusqlite::Result<Documentation> {
    let project_id: String = row.get("project_id")?;
    let sections_json: String = row.get("sections")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Documentation {
        id: row.get("id")?,
        project_id: Uuid::parse_str(&project_id).unwrap_or_default(),
        markdown: row.get("markdown")?,
        sections: serde_json::from_str(&sections_json).unwrap_or_default(),
        word_count: row.get::<_, i64>("word_count")?.max(0) as usize,
        generation_secs: row.get("generation_secs")?,
        version: row.get("version")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
