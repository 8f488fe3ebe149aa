//! Project CRUD and status bookkeeping
//!
//! The status tuple (status, progress_percentage, progress_stage) is the
//! polling contract with consumers: it is kept current after every stage
//! and progress never decreases within a `processing` run.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use super::database::SharedDatabase;
use crate::analyzer::CodebaseStats;
use crate::constants::pipeline as limits;
use crate::types::{
    Project, ProjectStatus, Result, ScopeError, SourceKind, truncate_message,
};

pub struct ProjectStore {
    db: SharedDatabase,
}

impl ProjectStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Create a new project in `pending` state.
    pub fn create(&self, name: &str, source_kind: SourceKind) -> Result<Project> {
        let name = name.trim();
        if name.len() < 2 {
            return Err(ScopeError::InvalidInput(
                "Project name must be at least 2 characters".to_string(),
            ));
        }
        if name.len() > 255 {
            return Err(ScopeError::InvalidInput(
                "Project name must be less than 255 characters".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        self.db.execute(
            "INSERT INTO projects (id, name, source_kind, status, progress_percentage, progress_stage, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'pending', 0, 'Initializing...', ?4, ?4)",
            &[&id.to_string(), &name, &source_kind.as_str(), &now.to_rfc3339()],
        )?;

        self.find(id)?.ok_or(ScopeError::ProjectNotFound(id))
    }

    pub fn find(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM projects WHERE id = ?1")?;
        let mut rows = stmt.query_map([id.to_string()], row_to_project)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All projects, newest first
    pub fn list(&self) -> Result<Vec<Project>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], row_to_project)?;
        rows.map(|r| r.map_err(ScopeError::from)).collect()
    }

    /// Atomically claim the project for a pipeline run.
    ///
    /// The conditional update guarantees at most one in-flight run per
    /// project: a second submission while status is `processing` is
    /// refused, never silently started.
    pub fn claim_processing(&self, id: Uuid) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.db.execute(
            "UPDATE projects
             SET status = 'processing', progress_percentage = 0,
                 progress_stage = 'Initializing...', error_message = NULL, updated_at = ?2
             WHERE id = ?1 AND status != 'processing'",
            &[&id.to_string(), &now],
        )?;

        if updated == 1 {
            return Ok(());
        }

        match self.find(id)? {
            Some(_) => Err(ScopeError::AlreadyProcessing(id)),
            None => Err(ScopeError::ProjectNotFound(id)),
        }
    }

    /// Update the polling status tuple.
    ///
    /// The stage label is truncated for storage. While not failing,
    /// progress is written as max(current, new) so it can never move
    /// backwards within a run. `processed_at` is set exactly once, on the
    /// first transition into `completed`.
    pub fn update_status(
        &self,
        id: Uuid,
        status: ProjectStatus,
        progress: u8,
        stage: &str,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let stage = truncate_message(stage, limits::STAGE_LABEL_MAX);

        let updated = match status {
            ProjectStatus::Failed => self.db.execute(
                "UPDATE projects
                 SET status = 'failed', progress_percentage = ?2, progress_stage = ?3, updated_at = ?4
                 WHERE id = ?1",
                &[&id.to_string(), &(progress as i64), &stage, &now],
            )?,
            ProjectStatus::Completed => self.db.execute(
                "UPDATE projects
                 SET status = 'completed',
                     progress_percentage = max(progress_percentage, ?2),
                     progress_stage = ?3,
                     processed_at = COALESCE(processed_at, ?4),
                     updated_at = ?4
                 WHERE id = ?1",
                &[&id.to_string(), &(progress as i64), &stage, &now],
            )?,
            _ => self.db.execute(
                "UPDATE projects
                 SET status = ?5,
                     progress_percentage = max(progress_percentage, ?2),
                     progress_stage = ?3,
                     updated_at = ?4
                 WHERE id = ?1",
                &[
                    &id.to_string(),
                    &(progress as i64),
                    &stage,
                    &now,
                    &status.as_str(),
                ],
            )?,
        };

        if updated == 0 {
            return Err(ScopeError::ProjectNotFound(id));
        }
        Ok(())
    }

    /// Mark the project failed, capturing the error message (bounded).
    pub fn fail(&self, id: Uuid, error: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let stage = truncate_message(
            &format!("Processing failed: {}", error),
            limits::STAGE_LABEL_MAX,
        );
        let message = truncate_message(error, limits::ERROR_MESSAGE_MAX);

        self.db.execute(
            "UPDATE projects
             SET status = 'failed', progress_percentage = 0, progress_stage = ?2,
                 error_message = ?3, updated_at = ?4
             WHERE id = ?1",
            &[&id.to_string(), &stage, &message, &now],
        )?;
        Ok(())
    }

    /// Persist structural analysis results.
    pub fn record_stats(&self, id: Uuid, stats: &CodebaseStats) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let technologies = serde_json::to_string(&stats.technologies)?;

        self.db.execute(
            "UPDATE projects
             SET file_count = ?2, total_lines = ?3, primary_language = ?4,
                 technologies = ?5, updated_at = ?6
             WHERE id = ?1",
            &[
                &id.to_string(),
                &(stats.file_count as i64),
                &(stats.total_lines as i64),
                &stats.primary_language,
                &technologies,
                &now,
            ],
        )?;
        Ok(())
    }

    /// Persist the color palette.
    pub fn set_palette(&self, id: Uuid, palette: &serde_json::Value) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.db.execute(
            "UPDATE projects SET color_palette = ?2, updated_at = ?3 WHERE id = ?1",
            &[&id.to_string(), &palette.to_string(), &now],
        )?;
        Ok(())
    }

    /// Persist security scan results.
    pub fn set_security(&self, id: Uuid, score: u8, vulnerability_count: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.db.execute(
            "UPDATE projects
             SET security_score = ?2, vulnerabilities_count = ?3, updated_at = ?4
             WHERE id = ?1",
            &[
                &id.to_string(),
                &(score as i64),
                &(vulnerability_count as i64),
                &now,
            ],
        )?;
        Ok(())
    }

    /// Delete a project; child rows cascade.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.db.execute(
            "DELETE FROM projects WHERE id = ?1",
            &[&id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    let id_str: String = row.get("id")?;
    let source_kind_str: String = row.get("source_kind")?;
    let status_str: String = row.get("status")?;
    let technologies_json: String = row.get("technologies")?;
    let palette_json: Option<String> = row.get("color_palette")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let processed_at: Option<String> = row.get("processed_at")?;

    Ok(Project {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        name: row.get("name")?,
        source_kind: SourceKind::parse(&source_kind_str).unwrap_or_default(),
        status: ProjectStatus::parse(&status_str).unwrap_or_default(),
        progress_percentage: row.get::<_, i64>("progress_percentage")?.clamp(0, 100) as u8,
        progress_stage: row.get("progress_stage")?,
        file_count: row.get("file_count")?,
        total_lines: row.get("total_lines")?,
        primary_language: row.get("primary_language")?,
        technologies: serde_json::from_str(&technologies_json).unwrap_or_default(),
        security_score: row.get("security_score")?,
        vulnerabilities_count: row.get("vulnerabilities_count")?,
        color_palette: palette_json.and_then(|j| serde_json::from_str(&j).ok()),
        error_message: row.get("error_message")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
        processed_at: processed_at.as_deref().map(parse_timestamp),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::sync::Arc;

    fn store() -> ProjectStore {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        ProjectStore::new(db)
    }

    #[test]
    fn test_create_and_find() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();

        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.progress_percentage, 0);
        assert!(store.find(project.id).unwrap().is_some());
    }

    #[test]
    fn test_create_rejects_short_name() {
        let store = store();
        assert!(store.create("x", SourceKind::Upload).is_err());
    }

    #[test]
    fn test_claim_refuses_second_run() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();

        store.claim_processing(project.id).unwrap();
        let second = store.claim_processing(project.id);
        assert!(matches!(second, Err(ScopeError::AlreadyProcessing(_))));
    }

    #[test]
    fn test_claim_allowed_after_completion() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();

        store.claim_processing(project.id).unwrap();
        store
            .update_status(project.id, ProjectStatus::Completed, 100, "done")
            .unwrap();
        assert!(store.claim_processing(project.id).is_ok());
    }

    #[test]
    fn test_claim_unknown_project() {
        let store = store();
        let result = store.claim_processing(Uuid::new_v4());
        assert!(matches!(result, Err(ScopeError::ProjectNotFound(_))));
    }

    #[test]
    fn test_progress_is_monotonic_while_processing() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();
        store.claim_processing(project.id).unwrap();

        store
            .update_status(project.id, ProjectStatus::Processing, 40, "docs")
            .unwrap();
        store
            .update_status(project.id, ProjectStatus::Processing, 10, "late write")
            .unwrap();

        let found = store.find(project.id).unwrap().unwrap();
        assert_eq!(found.progress_percentage, 40);
        assert_eq!(found.progress_stage, "late write");
    }

    #[test]
    fn test_processed_at_set_once_on_completion() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();
        store.claim_processing(project.id).unwrap();

        store
            .update_status(project.id, ProjectStatus::Completed, 100, "Documentation ready")
            .unwrap();
        let first = store.find(project.id).unwrap().unwrap().processed_at.unwrap();

        store
            .update_status(project.id, ProjectStatus::Completed, 100, "All analysis complete")
            .unwrap();
        let second = store.find(project.id).unwrap().unwrap().processed_at.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_fail_resets_progress_and_captures_error() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();
        store.claim_processing(project.id).unwrap();
        store
            .update_status(project.id, ProjectStatus::Processing, 40, "docs")
            .unwrap();

        store.fail(project.id, "generation exploded").unwrap();

        let found = store.find(project.id).unwrap().unwrap();
        assert_eq!(found.status, ProjectStatus::Failed);
        assert_eq!(found.progress_percentage, 0);
        assert_eq!(found.error_message.as_deref(), Some("generation exploded"));
    }

    #[test]
    fn test_fail_bounds_error_message() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();
        store.claim_processing(project.id).unwrap();

        let huge = "e".repeat(2_000);
        store.fail(project.id, &huge).unwrap();

        let found = store.find(project.id).unwrap().unwrap();
        assert_eq!(
            found.error_message.unwrap().len(),
            crate::constants::pipeline::ERROR_MESSAGE_MAX
        );
    }

    #[test]
    fn test_stage_label_truncated() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();
        store.claim_processing(project.id).unwrap();

        let long_stage = "s".repeat(500);
        store
            .update_status(project.id, ProjectStatus::Processing, 10, &long_stage)
            .unwrap();

        let found = store.find(project.id).unwrap().unwrap();
        assert_eq!(
            found.progress_stage.len(),
            crate::constants::pipeline::STAGE_LABEL_MAX
        );
    }

    #[test]
    fn test_record_stats() {
        let store = store();
        let project = store.create("demo", SourceKind::Upload).unwrap();

        let files: crate::types::FileSet =
            [("a.py", "x\ny"), ("b.py", "z")].into_iter().collect();
        let stats = crate::analyzer::StructureAnalyzer::analyze(&files);
        store.record_stats(project.id, &stats).unwrap();

        let found = store.find(project.id).unwrap().unwrap();
        assert_eq!(found.file_count, Some(2));
        assert_eq!(found.total_lines, Some(3));
        assert_eq!(found.primary_language.as_deref(), Some("Python"));
    }
}
