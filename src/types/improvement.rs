//! Code improvement record and normalization of model vocabulary
//!
//! The model returns free-form category/impact/effort strings; the
//! normalization here canonicalizes them so downstream filters see a
//! stable vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Canonical improvement categories produced by [`normalize_category`]
pub const CANONICAL_CATEGORIES: &[&str] = &[
    "performance",
    "readability",
    "best-practice",
    "maintainability",
    "security",
    "error-handling",
];

/// Impact of applying an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Lenient parse: unrecognized values default to `medium`
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s.trim().to_lowercase().as_str()).unwrap_or_default()
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonicalize a free-form category string from the model.
///
/// Case-folds, trims, replaces spaces with hyphens, then remaps common
/// variations by substring ("Best Practices" → `best-practice`,
/// "perf issue" → `performance`). Strings matching no remap are kept as
/// their hyphenated form.
pub fn normalize_category(raw: &str) -> String {
    let category = raw.to_lowercase().trim().replace(' ', "-");

    if category.contains("best") && category.contains("practice") {
        "best-practice".to_string()
    } else if category.contains("performance") || category.contains("perf") {
        "performance".to_string()
    } else if category.contains("readability")
        || category.contains("readable")
        || category.contains("clarity")
    {
        "readability".to_string()
    } else if category.contains("maintain") {
        "maintainability".to_string()
    } else if category.contains("secur") {
        "security".to_string()
    } else if category.contains("error") && category.contains("handling") {
        "error-handling".to_string()
    } else {
        category
    }
}

/// One quality improvement suggestion reported by the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeImprovement {
    #[serde(default)]
    pub id: i64,
    pub project_id: Uuid,
    /// Normalized category (see [`normalize_category`])
    pub category: String,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    pub improved_code: Option<String>,
    pub impact_level: ImpactLevel,
    pub estimated_effort: Option<ImpactLevel>,
    pub file_path: String,
    pub line_number: Option<i64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl CodeImprovement {
    /// Validate one element of the model's response array.
    ///
    /// Required fields: category, title, description, suggestion,
    /// impact_level. Category is normalized; impact/effort outside
    /// {high, medium, low} default to `medium`.
    pub fn from_model_value(project_id: Uuid, value: &Value) -> Option<Self> {
        let category = normalize_category(value.get("category")?.as_str()?);
        let title = non_empty_str(value, "title")?;
        let description = non_empty_str(value, "description")?;
        let suggestion = non_empty_str(value, "suggestion")?;
        let impact_level = ImpactLevel::parse_lenient(value.get("impact_level")?.as_str()?);

        Some(Self {
            id: 0,
            project_id,
            category,
            title,
            description,
            suggestion,
            improved_code: value
                .get("improved_code")
                .and_then(Value::as_str)
                .map(str::to_string),
            impact_level,
            estimated_effort: value
                .get("estimated_effort")
                .and_then(Value::as_str)
                .map(ImpactLevel::parse_lenient),
            file_path: value
                .get("file_path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            line_number: value.get("line_number").and_then(Value::as_i64),
            created_at: Utc::now(),
        })
    }
}

fn non_empty_str(value: &Value, field: &str) -> Option<String> {
    let s = value.get(field)?.as_str()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}
