//! Quality Scanner
//!
//! Batched code-quality review over a FileSet. Same batching shape as the
//! security scanner but with natural file order, a different record
//! schema, and vocabulary normalization of the model's free-form
//! category/impact/effort strings.

use uuid::Uuid;

use super::batch::BatchAnalyzer;
use crate::ai::SharedGenerator;
use crate::config::ScanConfig;
use crate::types::{CodeImprovement, FileSet};

const SYSTEM_MESSAGE: &str = "You are a code quality expert. Return only valid JSON array.";

pub struct QualityScanner {
    batch: BatchAnalyzer,
}

impl QualityScanner {
    pub fn new(generator: SharedGenerator, config: &ScanConfig) -> Self {
        Self {
            batch: BatchAnalyzer::new(generator, config.batch_size, config.max_file_chars),
        }
    }

    /// Scan a FileSet for improvement suggestions.
    ///
    /// Files are analyzed in natural (path) order; `max_files` caps the
    /// list, `None` scans everything.
    pub async fn scan(
        &self,
        project_id: Uuid,
        files: &FileSet,
        max_files: Option<usize>,
    ) -> Vec<CodeImprovement> {
        let mut ordered: Vec<(String, String)> = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();

        if let Some(cap) = max_files {
            ordered.truncate(cap);
        }

        tracing::info!("[quality] Analyzing {} files in batches", ordered.len());

        self.batch
            .run(
                "quality",
                &ordered,
                SYSTEM_MESSAGE,
                quality_prompt,
                |value| CodeImprovement::from_model_value(project_id, value),
            )
            .await
    }
}

fn quality_prompt(context: &str) -> String {
    format!(
        r#"Analyze these code files for quality improvements:
{context}

Find code quality issues in ANY of these files and return a JSON array. For each issue:

{{
  "file_path": "exact path from above",
  "category": "performance|readability|best-practice|maintainability|security|error-handling",
  "title": "Brief title",
  "description": "What needs improvement",
  "suggestion": "How to improve",
  "improved_code": "improved code example",
  "impact_level": "high|medium|low",
  "estimated_effort": "high|medium|low",
  "line_number": 42
}}

Return ONLY the JSON array, no other text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionRequest, TextGenerator};
    use crate::types::{ImpactLevel, Result};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OneShotGenerator(String);

    #[async_trait]
    impl TextGenerator for OneShotGenerator {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "oneshot"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    #[tokio::test]
    async fn test_scan_normalizes_model_vocabulary() {
        let response = r#"[
            {
                "file_path": "a.py",
                "category": "Best Practices",
                "title": "t",
                "description": "d",
                "suggestion": "s",
                "impact_level": "severe"
            },
            {
                "file_path": "a.py",
                "category": "perf",
                "title": "t2",
                "description": "d2",
                "suggestion": "s2",
                "impact_level": "low"
            }
        ]"#;
        let generator = Arc::new(OneShotGenerator(response.to_string()));
        let scanner = QualityScanner::new(generator, &ScanConfig::default());

        let files: FileSet = [("a.py", "print(1)")].into_iter().collect();
        let improvements = scanner.scan(Uuid::new_v4(), &files, None).await;

        assert_eq!(improvements.len(), 2);
        assert_eq!(improvements[0].category, "best-practice");
        assert_eq!(improvements[0].impact_level, ImpactLevel::Medium);
        assert_eq!(improvements[1].category, "performance");
        assert_eq!(improvements[1].impact_level, ImpactLevel::Low);
    }

    #[tokio::test]
    async fn test_scan_drops_incomplete_records() {
        let response = r#"[
            {"category": "performance", "title": "only a title"},
            {
                "file_path": "a.py",
                "category": "readability",
                "title": "t",
                "description": "d",
                "suggestion": "s",
                "impact_level": "high"
            }
        ]"#;
        let generator = Arc::new(OneShotGenerator(response.to_string()));
        let scanner = QualityScanner::new(generator, &ScanConfig::default());

        let files: FileSet = [("a.py", "print(1)")].into_iter().collect();
        let improvements = scanner.scan(Uuid::new_v4(), &files, None).await;

        assert_eq!(improvements.len(), 1);
        assert_eq!(improvements[0].category, "readability");
    }
}
