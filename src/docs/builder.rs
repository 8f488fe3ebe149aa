//! Documentation Builder
//!
//! Selects a bounded, representative subset of files, issues exactly one
//! generation call with a fixed structural outline, splits the returned
//! markdown into typed sections, and appends a project statistics footer.

use tracing::info;

use super::sections::{split_sections, word_count};
use crate::ai::{CompletionRequest, SharedGenerator};
use crate::analyzer::CodebaseStats;
use crate::constants::docs as limits;
use crate::types::{DocSection, FileSet, Result};

/// Config-file names recognized for sampling
const CONFIG_FILE_NAMES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "setup.py",
    "cargo.toml",
    "pom.xml",
    "build.gradle",
    "composer.json",
    "go.mod",
];

/// Entry-point file names recognized for sampling
const ENTRY_FILE_NAMES: &[&str] = &[
    "main.py", "index.js", "app.py", "main.go", "main.rs", "index.ts", "server.js", "app.js",
];

const SYSTEM_MESSAGE: &str =
    "You are a technical writer. Generate CONCISE documentation by analyzing code. Be brief and direct.";

/// Generated documentation: the full markdown plus its parsed sections
#[derive(Debug, Clone)]
pub struct GeneratedDocs {
    pub markdown: String,
    pub sections: Vec<DocSection>,
    pub word_count: usize,
}

/// Key files grouped by role
#[derive(Debug, Default)]
pub struct ImportantFiles {
    pub readmes: Vec<String>,
    pub configs: Vec<String>,
    pub entry_points: Vec<String>,
}

/// Identify README, config, and entry-point files in a FileSet
pub fn identify_important_files(files: &FileSet) -> ImportantFiles {
    let mut important = ImportantFiles::default();

    for path in files.paths() {
        let filename = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if filename.contains("readme") {
            important.readmes.push(path.to_string());
        }
        if CONFIG_FILE_NAMES.contains(&filename.as_str()) || filename.ends_with(".config.js") {
            important.configs.push(path.to_string());
        }
        if ENTRY_FILE_NAMES.contains(&filename.as_str()) {
            important.entry_points.push(path.to_string());
        }
    }

    important
}

/// Select the representative sample sent to the generation call.
///
/// Priority: README files, then up to 3 config files, then up to 3 entry
/// points, then remaining slots (up to 10 total) filled from the FileSet
/// in encounter order. Each selected file is truncated to its role's
/// character budget.
pub fn select_samples(files: &FileSet) -> Vec<(String, String)> {
    let important = identify_important_files(files);
    let mut samples: Vec<(String, String)> = Vec::new();

    let push = |path: &str, budget: usize, samples: &mut Vec<(String, String)>| {
        if samples.iter().any(|(p, _)| p == path) {
            return;
        }
        if let Some(content) = files.get(path) {
            samples.push((path.to_string(), truncate_chars(content, budget).to_string()));
        }
    };

    for path in &important.readmes {
        push(path, limits::README_CHARS, &mut samples);
    }
    for path in important.configs.iter().take(limits::MAX_CONFIG_FILES) {
        push(path, limits::CONFIG_CHARS, &mut samples);
    }
    for path in important.entry_points.iter().take(limits::MAX_ENTRY_FILES) {
        push(path, limits::ENTRY_CHARS, &mut samples);
    }

    for (path, _) in files.iter() {
        if samples.len() >= limits::MAX_SAMPLE_FILES {
            break;
        }
        push(path, limits::FILL_CHARS, &mut samples);
    }

    samples.truncate(limits::MAX_SAMPLE_FILES);
    samples
}

pub struct DocumentationBuilder {
    generator: SharedGenerator,
}

impl DocumentationBuilder {
    pub fn new(generator: SharedGenerator) -> Self {
        Self { generator }
    }

    /// Generate documentation for a project.
    ///
    /// Issues exactly one generation call. The statistics footer is
    /// appended after section splitting, unless the model already produced
    /// a "Project Statistics" heading.
    pub async fn build(
        &self,
        project_name: &str,
        files: &FileSet,
        stats: &CodebaseStats,
    ) -> Result<GeneratedDocs> {
        let samples = select_samples(files);
        info!(
            "Generating documentation for '{}' from {} sample files",
            project_name,
            samples.len()
        );

        let request = CompletionRequest::new(documentation_prompt(project_name, &samples))
            .with_system(SYSTEM_MESSAGE)
            .with_max_tokens(limits::DOC_MAX_TOKENS);

        let mut markdown = self.generator.complete(&request).await?;
        let sections = split_sections(&markdown);

        if !markdown.contains("Project Statistics") {
            markdown.push_str(&statistics_footer(stats));
        }

        let word_count = word_count(&markdown);
        Ok(GeneratedDocs {
            markdown,
            sections,
            word_count,
        })
    }
}

/// Render the project statistics footer
fn statistics_footer(stats: &CodebaseStats) -> String {
    let mut footer = String::from("\n\n---\n\n**Project Statistics:**\n");
    footer.push_str(&format!("- Total Files: {}\n", stats.file_count));
    footer.push_str(&format!("- Total Lines of Code: {}\n", stats.total_lines));
    footer.push_str(&format!("- Primary Language: {}\n", stats.primary_language));

    if !stats.technologies.is_empty() {
        let listed: Vec<&str> = stats
            .technologies
            .iter()
            .take(limits::MAX_FOOTER_TECHNOLOGIES)
            .map(String::as_str)
            .collect();
        footer.push_str(&format!("- Technologies: {}\n", listed.join(", ")));
    }

    footer
}

fn documentation_prompt(project_name: &str, samples: &[(String, String)]) -> String {
    let mut code_context = String::new();
    for (path, content) in samples {
        code_context.push_str(&format!("\n\n### File: {}\n```\n{}\n```", path, content));
    }

    format!(
        r#"Generate concise technical documentation for '{project_name}'.

Code Files:{code_context}

# {project_name} Documentation

## Purpose and Objectives
What does this project do? What problems does it solve? (2-3 sentences)

## Setup and Installation

### Prerequisites and Dependencies
### Installation Instructions
### Configuration Steps

## Architecture Documentation

### System Architecture and Tech Stack
### Component Relationships
### Simple Data Flow

## Code Documentation

### API Reference and Endpoints
### Function/Method Documentation
### Usage Examples and Code Samples

## User Guides

### Feature Documentation
### FAQs

## Development Documentation

### Coding Standards and Conventions
### Testing Procedures
### Deployment Processes

## Maintenance Information

### Known Issues and Limitations
### Performance Considerations
### Security Considerations

## Reference Materials

### Glossary of Terms
### External Dependencies

---

**Keep it concise! Each section should be 2-5 sentences max. If info isn't in code, write "Not specified in codebase".**"#
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
