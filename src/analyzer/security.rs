//! Security Scanner
//!
//! Batched vulnerability scan over a FileSet. Files are ordered by risk
//! priority so the highest-value targets are analyzed first when a cap
//! truncates the list, then grouped into batches for the shared batch
//! analysis client. Findings are validated records; an aggregate score is
//! computed with a fixed linear penalty rule.

use std::cmp::Reverse;

use uuid::Uuid;

use super::batch::BatchAnalyzer;
use crate::ai::SharedGenerator;
use crate::config::ScanConfig;
use crate::types::{FileSet, SecurityFinding, Severity};

/// Extensions treated as backend languages for priority ordering
const BACKEND_EXTENSIONS: &[&str] = &["py", "js", "ts", "php", "java", "go"];

/// Filename keywords that mark a file as security-sensitive
const SENSITIVE_KEYWORDS: &[&str] = &["auth", "login", "password", "database", "db", "sql", "api"];

const SYSTEM_MESSAGE: &str = "You are a security expert. Return only valid JSON array.";

pub struct SecurityScanner {
    batch: BatchAnalyzer,
}

impl SecurityScanner {
    pub fn new(generator: SharedGenerator, config: &ScanConfig) -> Self {
        Self {
            batch: BatchAnalyzer::new(generator, config.batch_size, config.max_file_chars),
        }
    }

    /// Scan a FileSet for vulnerabilities.
    ///
    /// `max_files` caps the number of files analyzed after priority
    /// ordering; `None` scans everything (the full-pipeline default).
    pub async fn scan(
        &self,
        project_id: Uuid,
        files: &FileSet,
        max_files: Option<usize>,
    ) -> Vec<SecurityFinding> {
        let mut ordered: Vec<(String, String)> = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        sort_by_priority(&mut ordered);

        if let Some(cap) = max_files {
            ordered.truncate(cap);
        }

        tracing::info!("[security] Analyzing {} files in batches", ordered.len());

        self.batch
            .run(
                "security",
                &ordered,
                SYSTEM_MESSAGE,
                security_prompt,
                |value| SecurityFinding::from_model_value(project_id, value),
            )
            .await
    }

    /// Aggregate security score for a set of findings.
    ///
    /// Starts at 100 and subtracts a fixed penalty per finding by severity
    /// (critical −20, high −10, medium −5, low −2, info −1), clamped to
    /// [0, 100].
    pub fn score(findings: &[SecurityFinding]) -> u8 {
        let penalty: u32 = findings.iter().map(|f| f.severity.penalty()).sum();
        100u32.saturating_sub(penalty).min(100) as u8
    }

    /// Count of critical and high findings
    pub fn vulnerability_count(findings: &[SecurityFinding]) -> usize {
        findings
            .iter()
            .filter(|f| matches!(f.severity, Severity::Critical | Severity::High))
            .count()
    }
}

/// Sort files so higher-risk files come first: backend-language extensions
/// before others, then security-sensitive filenames. Stable, so files
/// within one priority class keep their original order.
fn sort_by_priority(files: &mut [(String, String)]) {
    files.sort_by_key(|(path, _)| {
        Reverse((has_backend_extension(path), has_sensitive_name(path)))
    });
}

fn has_backend_extension(path: &str) -> bool {
    crate::types::extension_of(path).is_some_and(|ext| BACKEND_EXTENSIONS.contains(&ext.as_str()))
}

fn has_sensitive_name(path: &str) -> bool {
    let filename = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    SENSITIVE_KEYWORDS.iter().any(|kw| filename.contains(kw))
}

fn security_prompt(context: &str) -> String {
    format!(
        r#"Analyze these code files for security vulnerabilities:
{context}

Find security issues in ANY of these files and return a JSON array. For each vulnerability:

{{
  "file_path": "exact path from above",
  "severity": "critical|high|medium|low|info",
  "category": "SQL Injection|XSS|Auth|etc",
  "title": "Brief title",
  "description": "What's the issue",
  "line_number": 42,
  "code_snippet": "relevant code",
  "recommendation": "How to fix"
}}

Return ONLY the JSON array, no other text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::types::FindingStatus;

    fn finding(severity: Severity) -> SecurityFinding {
        SecurityFinding {
            id: 0,
            project_id: Uuid::new_v4(),
            severity,
            category: "test".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            recommendation: "r".to_string(),
            file_path: "f.py".to_string(),
            line_number: None,
            code_snippet: None,
            references: Vec::new(),
            status: FindingStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_score_with_fixed_severities() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::High),
            finding(Severity::Medium),
            finding(Severity::Medium),
            finding(Severity::Info),
        ];
        // 100 - 20 - 10 - 5 - 5 - 1
        assert_eq!(SecurityScanner::score(&findings), 59);
    }

    #[test]
    fn test_score_clamps_to_zero() {
        let findings: Vec<SecurityFinding> =
            (0..10).map(|_| finding(Severity::Critical)).collect();
        assert_eq!(SecurityScanner::score(&findings), 0);
    }

    #[test]
    fn test_empty_findings_score_100() {
        assert_eq!(SecurityScanner::score(&[]), 100);
    }

    #[test]
    fn test_vulnerability_count_counts_critical_and_high() {
        let findings = vec![
            finding(Severity::Critical),
            finding(Severity::High),
            finding(Severity::Medium),
            finding(Severity::Info),
        ];
        assert_eq!(SecurityScanner::vulnerability_count(&findings), 2);
    }

    #[test]
    fn test_priority_ordering() {
        let mut files = vec![
            ("docs/notes.md".to_string(), "x".to_string()),
            ("src/util.py".to_string(), "x".to_string()),
            ("src/auth.py".to_string(), "x".to_string()),
            ("styles/auth.css".to_string(), "x".to_string()),
        ];
        sort_by_priority(&mut files);

        let order: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        // backend + sensitive first, then backend, then sensitive-only, then rest
        assert_eq!(
            order,
            vec!["src/auth.py", "src/util.py", "styles/auth.css", "docs/notes.md"]
        );
    }

    #[test]
    fn test_priority_sort_is_stable_within_class() {
        let mut files = vec![
            ("b.py".to_string(), "x".to_string()),
            ("a.py".to_string(), "x".to_string()),
        ];
        sort_by_priority(&mut files);
        let order: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(order, vec!["b.py", "a.py"]);
    }
}
