//! Markdown Section Splitting
//!
//! Splits generated documentation into titled sections on second-level
//! headings. Section titles map to a categorical type through a fixed
//! lookup; trailing empty sections are dropped.

use crate::types::{DocSection, SectionType};

/// Split markdown into sections.
///
/// Every line beginning with `## ` starts a new section. Content before
/// the first heading is ignored. Sections whose accumulated content is
/// empty after trimming are dropped; surviving sections record their
/// 0-based order of appearance.
pub fn split_sections(markdown: &str) -> Vec<DocSection> {
    let mut sections = Vec::new();
    let mut current_title: Option<String> = None;
    let mut current_content: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            flush_section(&current_title, &mut current_content, &mut sections);
            current_title = Some(heading.trim().to_string());
        } else if current_title.is_some() {
            current_content.push(line);
        }
    }
    flush_section(&current_title, &mut current_content, &mut sections);

    sections
}

fn flush_section(title: &Option<String>, content: &mut Vec<&str>, out: &mut Vec<DocSection>) {
    if let Some(title) = title {
        let text = content.join("\n").trim().to_string();
        if !text.is_empty() {
            out.push(DocSection {
                section_type: SectionType::from_title(title),
                title: title.clone(),
                content: text,
                order: out.len(),
            });
        }
    }
    content.clear();
}

/// Count whitespace-delimited tokens
pub fn word_count(markdown: &str) -> usize {
    markdown.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_sections() {
        let md = "## Purpose and Objectives\nText A\n## Setup and Installation\nText B\n";
        let sections = split_sections(md);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section_type, SectionType::Purpose);
        assert_eq!(sections[0].title, "Purpose and Objectives");
        assert_eq!(sections[0].content, "Text A");
        assert_eq!(sections[0].order, 0);
        assert_eq!(sections[1].section_type, SectionType::Setup);
        assert_eq!(sections[1].order, 1);
    }

    #[test]
    fn test_unmapped_title_gets_other() {
        let md = "## Surprise Heading\nSomething\n";
        let sections = split_sections(md);
        assert_eq!(sections[0].section_type, SectionType::Other);
    }

    #[test]
    fn test_empty_sections_dropped() {
        let md = "## Purpose and Objectives\nText\n## Setup and Installation\n\n";
        let sections = split_sections(md);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Purpose and Objectives");
    }

    #[test]
    fn test_preamble_before_first_heading_ignored() {
        let md = "# Project Docs\nintro text\n## User Guides\nguide body\n";
        let sections = split_sections(md);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_type, SectionType::UserGuide);
        assert_eq!(sections[0].content, "guide body");
    }

    #[test]
    fn test_third_level_headings_stay_in_section() {
        let md = "## Code Documentation\n### API Reference\ndetails\n";
        let sections = split_sections(md);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("### API Reference"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count("   "), 0);
    }
}
