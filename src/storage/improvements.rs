//! Code improvement persistence

use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use super::database::SharedDatabase;
use crate::types::{CodeImprovement, ImpactLevel, Result, ScopeError};

pub struct ImprovementStore {
    db: SharedDatabase,
}

impl ImprovementStore {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Insert a batch of improvements atomically.
    pub fn insert_many(&self, improvements: &[CodeImprovement]) -> Result<usize> {
        if improvements.is_empty() {
            return Ok(0);
        }

        self.db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO code_improvements
                 (project_id, category, title, description, suggestion, improved_code,
                  impact_level, estimated_effort, file_path, line_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for improvement in improvements {
                stmt.execute(rusqlite::params![
                    improvement.project_id.to_string(),
                    improvement.category,
                    improvement.title,
                    improvement.description,
                    improvement.suggestion,
                    improvement.improved_code,
                    improvement.impact_level.as_str(),
                    improvement.estimated_effort.map(|e| e.as_str()),
                    improvement.file_path,
                    improvement.line_number,
                    improvement.created_at.to_rfc3339(),
                ])?;
            }
            Ok(improvements.len())
        })
    }

    /// All improvements for a project, highest impact first.
    pub fn list_by_project(&self, project_id: Uuid) -> Result<Vec<CodeImprovement>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM code_improvements
             WHERE project_id = ?1
             ORDER BY CASE impact_level
                 WHEN 'high' THEN 0
                 WHEN 'medium' THEN 1
                 ELSE 2
             END, id",
        )?;
        let rows = stmt.query_map([project_id.to_string()], row_to_improvement)?;
        rows.map(|r| r.map_err(ScopeError::from)).collect()
    }
}

fn row_to_improvement(row: &Row<'_>) -> rusqlite::Result<CodeImprovement> {
    let project_id: String = row.get("project_id")?;
    let impact: String = row.get("impact_level")?;
    let effort: Option<String> = row.get("estimated_effort")?;
    let created_at: String = row.get("created_at")?;

    Ok(CodeImprovement {
        id: row.get("id")?,
        project_id: Uuid::parse_str(&project_id).unwrap_or_default(),
        category: row.get("category")?,
        title: row.get("title")?,
        description: row.get("description")?,
        suggestion: row.get("suggestion")?,
        improved_code: row.get("improved_code")?,
        impact_level: ImpactLevel::parse(&impact).unwrap_or_default(),
        estimated_effort: effort.as_deref().and_then(ImpactLevel::parse),
        file_path: row.get("file_path")?,
        line_number: row.get("line_number")?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, ProjectStore};
    use crate::types::SourceKind;
    use std::sync::Arc;

    fn setup() -> (ImprovementStore, Uuid) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        let projects = ProjectStore::new(db.clone());
        let project = projects.create("demo", SourceKind::Upload).unwrap();
        (ImprovementStore::new(db), project.id)
    }

    fn improvement(project_id: Uuid, impact: ImpactLevel) -> CodeImprovement {
        CodeImprovement {
            id: 0,
            project_id,
            category: "performance".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            suggestion: "s".to_string(),
            improved_code: None,
            impact_level: impact,
            estimated_effort: Some(ImpactLevel::Low),
            file_path: "a.py".to_string(),
            line_number: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_list_ordered_by_impact() {
        let (store, project_id) = setup();
        let improvements = vec![
            improvement(project_id, ImpactLevel::Low),
            improvement(project_id, ImpactLevel::High),
            improvement(project_id, ImpactLevel::Medium),
        ];
        assert_eq!(store.insert_many(&improvements).unwrap(), 3);

        let listed = store.list_by_project(project_id).unwrap();
        let impacts: Vec<ImpactLevel> = listed.iter().map(|i| i.impact_level).collect();
        assert_eq!(
            impacts,
            vec![ImpactLevel::High, ImpactLevel::Medium, ImpactLevel::Low]
        );
        assert_eq!(listed[0].estimated_effort, Some(ImpactLevel::Low));
    }
}
