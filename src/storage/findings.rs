//! Security finding persistence

use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use super::database::SharedDatabase;
use crate::types::{FindingStatus, Result, ScopeError, SecurityFinding, Severity};

pub struct FindingStore {
    db: SharedDatabase,
}

impl FindingStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Insert a batch of findings atomically.
    pub fn insert_many(&self, findings: &[SecurityFinding]) -> Result<usize> {
        if findings.is_empty() {
            return Ok(0);
        }

        self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO security_findings
                 (project_id, severity, category, title, description, recommendation,
                  file_path, line_number, code_snippet, refs, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for finding in findings {
                let refs = serde_json::to_string(&finding.references)?;
                stmt.execute(rusqlite::params![
                    finding.project_id.to_string(),
                    finding.severity.as_str(),
                    finding.category,
                    finding.title,
                    finding.description,
                    finding.recommendation,
                    finding.file_path,
                    finding.line_number,
                    finding.code_snippet,
                    refs,
                    finding.status.as_str(),
                    finding.created_at.to_rfc3339(),
                ])?;
            }
            Ok(findings.len())
        })
    }

    /// All findings for a project, worst severity first.
    pub fn list_by_project(&self, project_id: Uuid) -> Result<Vec<SecurityFinding>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM security_findings
             WHERE project_id = ?1
             ORDER BY CASE severity
                 WHEN 'critical' THEN 0
                 WHEN 'high' THEN 1
                 WHEN 'medium' THEN 2
                 WHEN 'low' THEN 3
                 ELSE 4
             END, id",
        )?;
        let rows = stmt.query_map([project_id.to_string()], row_to_finding)?;
        rows.map(|r| r.map_err(ScopeError::from)).collect()
    }

    /// Update triage status of one finding.
    pub fn set_status(&self, finding_id: i64, status: FindingStatus) -> Result<()> {
        self.db.execute(
            "UPDATE security_findings SET status = ?2 WHERE id = ?1",
            &[&finding_id, &status.as_str()],
        )?;
        Ok(())
    }
}

fn row_to_finding(row: &Row<'_>) -> rusqlite::Result<SecurityFinding> {
    let project_id: String = row.get("project_id")?;
    let severity: String = row.get("severity")?;
    let status: String = row.get("status")?;
    let refs_json: String = row.get("refs")?;
    let created_at: String = row.get("created_at")?;

    Ok(SecurityFinding {
        id: row.get("id")?,
        project_id: Uuid::parse_str(&project_id).unwrap_or_default(),
        severity: Severity::parse(&severity).unwrap_or(Severity::Info),
        category: row.get("category")?,
        title: row.get("title")?,
        description: row.get("description")?,
        recommendation: row.get("recommendation")?,
        file_path: row.get("file_path")?,
        line_number: row.get("line_number")?,
        code_snippet: row.get("code_snippet")?,
        references: serde_json::from_str(&refs_json).unwrap_or_default(),
        status: FindingStatus::parse(&status).unwrap_or_default(),
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
    })
}
