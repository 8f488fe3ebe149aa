//! Documentation Generation
//!
//! One generation call over a representative file sample, split into
//! typed sections.

pub mod builder;
pub mod sections;

pub use builder::{
    DocumentationBuilder, GeneratedDocs, ImportantFiles, identify_important_files, select_samples,
};
pub use sections::{split_sections, word_count};
