//! Pipeline Stage Descriptors
//!
//! The pipeline is a fixed, hand-coded sequence described by an ordered
//! stage table, not a configurable DAG. Each stage carries its progress
//! checkpoint, its polling label, and whether its failure aborts the run.

/// One unit of the pipeline, in execution order.
///
/// Critical stages abort the run on failure; the rest are best-effort
/// enrichment whose failure is logged and contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Pure structural analysis of the FileSet
    Structure,
    /// Static color palette extraction
    Palette,
    /// AI documentation generation, the checkpoint gate
    Documentation,
    /// Batched vulnerability scan (background)
    Security,
    /// Batched quality review (background)
    Quality,
    /// Retrieval index rebuild (background)
    Indexing,
}

/// All stages in execution order
pub const STAGES: &[PipelineStage] = &[
    PipelineStage::Structure,
    PipelineStage::Palette,
    PipelineStage::Documentation,
    PipelineStage::Security,
    PipelineStage::Quality,
    PipelineStage::Indexing,
];

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Palette => "palette",
            Self::Documentation => "documentation",
            Self::Security => "security",
            Self::Quality => "quality",
            Self::Indexing => "indexing",
        }
    }

    /// Progress checkpoint written when the stage begins, for the
    /// foreground stages. Background stages do not touch progress: the
    /// project is already externally `completed` while they run.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Structure => Some(10),
            Self::Palette => Some(20),
            Self::Documentation => Some(40),
            _ => None,
        }
    }

    /// Polling label written when the stage begins
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Structure => Some("Analyzing code structure..."),
            Self::Palette => Some("Analyzing color palette..."),
            Self::Documentation => Some("Generating documentation..."),
            _ => None,
        }
    }

    /// Critical stages abort the entire run with status `failed`.
    ///
    /// Only structural analysis and documentation generation are hard
    /// dependencies; everything else degrades gracefully.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Structure | Self::Documentation)
    }

    /// Background stages run after the completed checkpoint
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Security | Self::Quality | Self::Indexing)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
