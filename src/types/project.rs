//! Project record and lifecycle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project lifecycle status.
///
/// `pending → processing → completed` on the happy path, `failed` only when
/// a critical stage (structure analysis or documentation generation) fails
/// before documentation exists. Background enrichment never reverts a
/// `completed` project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the project's files came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Upload,
    PublicRepo,
    PrivateRepo,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::PublicRepo => "public-repo",
            Self::PrivateRepo => "private-repo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upload" => Some(Self::Upload),
            "public-repo" => Some(Self::PublicRepo),
            "private-repo" => Some(Self::PrivateRepo),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One analysis run over one uploaded or fetched source tree.
///
/// The aggregate root: documentation, findings, improvements, and embedding
/// chunks are all owned by exactly one project and cascade-deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub source_kind: SourceKind,
    pub status: ProjectStatus,
    /// 0-100, monotonically non-decreasing while status is `processing`
    pub progress_percentage: u8,
    /// Free-text label of the last completed step, bounded for storage
    pub progress_stage: String,
    pub file_count: Option<i64>,
    pub total_lines: Option<i64>,
    pub primary_language: Option<String>,
    pub technologies: Vec<String>,
    /// 0-100, higher is better; set by the security scan
    pub security_score: Option<i64>,
    /// Count of critical + high findings
    pub vulnerabilities_count: Option<i64>,
    pub color_palette: Option<serde_json::Value>,
    /// Set only on failure, bounded length
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set exactly once, on the transition into `completed`
    pub processed_at: Option<DateTime<Utc>>,
}
