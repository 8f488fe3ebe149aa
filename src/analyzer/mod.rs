//! Analysis Stages
//!
//! Structural analysis (pure), the shared batch analysis client, the two
//! batched AI scanners, and static palette extraction.

pub mod batch;
pub mod palette;
pub mod quality;
pub mod security;
pub mod structure;

pub use batch::{BatchAnalyzer, build_batch_context};
pub use palette::{ColorPalette, PaletteColor, extract_palette};
pub use quality::QualityScanner;
pub use security::SecurityScanner;
pub use structure::{CodebaseStats, LargestFile, StructureAnalyzer, detect_primary_language};
