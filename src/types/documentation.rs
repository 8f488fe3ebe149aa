//! Documentation record and section types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorical section type, mapped from second-level heading titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Purpose,
    Setup,
    Architecture,
    Code,
    UserGuide,
    Development,
    Maintenance,
    Notes,
    Reference,
    Other,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::Setup => "setup",
            Self::Architecture => "architecture",
            Self::Code => "code",
            Self::UserGuide => "user_guide",
            Self::Development => "development",
            Self::Maintenance => "maintenance",
            Self::Notes => "notes",
            Self::Reference => "reference",
            Self::Other => "other",
        }
    }

    /// Map a section heading title to its categorical type.
    ///
    /// Unmapped titles get `Other`.
    pub fn from_title(title: &str) -> Self {
        match title.trim().to_lowercase().as_str() {
            "purpose and objectives" => Self::Purpose,
            "setup and installation" => Self::Setup,
            "architecture documentation" => Self::Architecture,
            "code documentation" => Self::Code,
            "user guides" => Self::UserGuide,
            "development documentation" => Self::Development,
            "maintenance information" => Self::Maintenance,
            "additional notes" => Self::Notes,
            "reference materials" => Self::Reference,
            _ => Self::Other,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purpose" => Some(Self::Purpose),
            "setup" => Some(Self::Setup),
            "architecture" => Some(Self::Architecture),
            "code" => Some(Self::Code),
            "user_guide" => Some(Self::UserGuide),
            "development" => Some(Self::Development),
            "maintenance" => Some(Self::Maintenance),
            "notes" => Some(Self::Notes),
            "reference" => Some(Self::Reference),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One titled section split out of the generated markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSection {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub title: String,
    pub content: String,
    /// 0-based order of appearance
    pub order: usize,
}

/// The current documentation version for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Documentation {
    pub id: i64,
    pub project_id: Uuid,
    pub markdown: String,
    pub sections: Vec<DocSection>,
    /// Whitespace-delimited token count of the markdown
    pub word_count: usize,
    pub generation_secs: Option<i64>,
    /// Incremented on manual update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
