//! Security finding record and its model-response validator
//!
//! Findings arrive as untrusted JSON from a generative model. The dedicated
//! parse step here produces either a valid record or nothing; unvalidated
//! JSON never reaches persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Finding severity, ordered worst-first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Lenient parse for model output: unknown severities coerce to `info`
    /// rather than rejecting the whole finding.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s.trim().to_lowercase().as_str()).unwrap_or(Self::Info)
    }

    /// Score penalty applied per finding of this severity.
    ///
    /// The aggregate security score starts at 100 and subtracts these,
    /// clamped to [0, 100].
    pub fn penalty(&self) -> u32 {
        match self {
            Self::Critical => 20,
            Self::High => 10,
            Self::Medium => 5,
            Self::Low => 2,
            Self::Info => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-driven triage status; findings are created `open`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FindingStatus {
    #[default]
    Open,
    Acknowledged,
    Fixed,
    FalsePositive,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Acknowledged => "acknowledged",
            Self::Fixed => "fixed",
            Self::FalsePositive => "false-positive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "acknowledged" => Some(Self::Acknowledged),
            "fixed" => Some(Self::Fixed),
            "false-positive" => Some(Self::FalsePositive),
            _ => None,
        }
    }
}

/// One security vulnerability reported by the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityFinding {
    #[serde(default)]
    pub id: i64,
    pub project_id: Uuid,
    pub severity: Severity,
    pub category: String,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub file_path: String,
    pub line_number: Option<i64>,
    pub code_snippet: Option<String>,
    pub references: Vec<String>,
    #[serde(default)]
    pub status: FindingStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SecurityFinding {
    /// Validate one element of the model's response array.
    ///
    /// Required fields: severity, title, description, recommendation,
    /// category. An unknown severity is coerced to `info`. Elements missing
    /// a required field are dropped (returns None), never an error.
    pub fn from_model_value(project_id: Uuid, value: &Value) -> Option<Self> {
        let severity = Severity::parse_lenient(value.get("severity")?.as_str()?);
        let title = non_empty_str(value, "title")?;
        let description = non_empty_str(value, "description")?;
        let recommendation = non_empty_str(value, "recommendation")?;
        let category = non_empty_str(value, "category")?;

        let references = value
            .get("references")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id: 0,
            project_id,
            severity,
            category,
            title,
            description,
            recommendation,
            file_path: value
                .get("file_path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            line_number: value.get("line_number").and_then(Value::as_i64),
            code_snippet: value
                .get("code_snippet")
                .and_then(Value::as_str)
                .map(str::to_string),
            references,
            status: FindingStatus::Open,
            created_at: Utc::now(),
        })
    }
}

fn non_empty_str(value: &Value, field: &str) -> Option<String> {
    let s = value.get(field)?.as_str()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_penalties() {
        assert_eq!(Severity::Critical.penalty(), 20);
        assert_eq!(Severity::High.penalty(), 10);
        assert_eq!(Severity::Medium.penalty(), 5);
        assert_eq!(Severity::Low.penalty(), 2);
        assert_eq!(Severity::Info.penalty(), 1);
    }

    #[test]
    fn test_lenient_severity_coerces_unknown_to_info() {
        assert_eq!(Severity::parse_lenient("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse_lenient("catastrophic"), Severity::Info);
    }

    #[test]
    fn test_from_model_value_valid() {
        let project_id = Uuid::new_v4();
        let value = json!({
            "severity": "high",
            "category": "SQL Injection",
            "title": "Unsanitized query",
            "description": "User input reaches a query string",
            "recommendation": "Use parameterized statements",
            "file_path": "src/db.py",
            "line_number": 42
        });

        let finding = SecurityFinding::from_model_value(project_id, &value).unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.file_path, "src/db.py");
        assert_eq!(finding.line_number, Some(42));
        assert_eq!(finding.status, FindingStatus::Open);
    }

    #[test]
    fn test_from_model_value_missing_required_field() {
        let value = json!({
            "severity": "high",
            "title": "No description",
            "recommendation": "n/a",
            "category": "auth"
        });
        assert!(SecurityFinding::from_model_value(Uuid::new_v4(), &value).is_none());
    }

    #[test]
    fn test_from_model_value_bad_severity_kept_as_info() {
        let value = json!({
            "severity": "ultra",
            "category": "xss",
            "title": "t",
            "description": "d",
            "recommendation": "r"
        });
        let finding = SecurityFinding::from_model_value(Uuid::new_v4(), &value).unwrap();
        assert_eq!(finding.severity, Severity::Info);
    }
}
