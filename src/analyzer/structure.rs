//! Structural Analyzer
//!
//! Pure computation over file contents: counts, extension histogram, size
//! metrics, language inference, and technology detection. No external
//! calls; same FileSet always produces the same output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{FileSet, extension_of};

/// Extension → language table for primary-language inference
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("rb", "Ruby"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("swift", "Swift"),
    ("kt", "Kotlin"),
];

/// Build-marker filename → technology label
const TECHNOLOGY_MARKERS: &[(&str, &str)] = &[
    ("package.json", "Node.js"),
    ("cargo.toml", "Cargo"),
    ("requirements.txt", "pip"),
    ("pyproject.toml", "Python packaging"),
    ("setup.py", "Python packaging"),
    ("go.mod", "Go modules"),
    ("pom.xml", "Maven"),
    ("build.gradle", "Gradle"),
    ("composer.json", "Composer"),
    ("gemfile", "Bundler"),
    ("dockerfile", "Docker"),
    ("docker-compose.yml", "Docker Compose"),
    ("docker-compose.yaml", "Docker Compose"),
];

/// Technologies reported at most
const MAX_TECHNOLOGIES: usize = 8;

/// If another language's file count exceeds this fraction of the winner's,
/// the project is reported as "Multiple"
const MULTIPLE_LANGUAGE_RATIO: f64 = 0.7;

/// Statistics derived from one FileSet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebaseStats {
    pub file_count: usize,
    /// Sum over files of (newline count + 1)
    pub total_lines: u64,
    /// Lowercased extension (with dot) → file count
    pub file_types: BTreeMap<String, usize>,
    /// Integer average of file sizes in bytes
    pub avg_file_size: usize,
    /// Path and size of the largest file
    pub largest_file: Option<LargestFile>,
    /// Single inferred language, "Multiple", or "Unknown"
    pub primary_language: String,
    /// Detected build tooling and languages, bounded
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargestFile {
    pub path: String,
    pub size: usize,
}

/// Analyzes codebase structure and content
pub struct StructureAnalyzer;

impl StructureAnalyzer {
    /// Analyze a FileSet. Pure and deterministic.
    pub fn analyze(files: &FileSet) -> CodebaseStats {
        let mut total_lines: u64 = 0;
        let mut total_size: usize = 0;
        let mut file_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut largest: Option<LargestFile> = None;

        for (path, content) in files.iter() {
            let lines = content.matches('\n').count() as u64 + 1;
            total_lines += lines;

            let size = content.len();
            total_size += size;

            if largest.as_ref().is_none_or(|l| size > l.size) {
                largest = Some(LargestFile {
                    path: path.to_string(),
                    size,
                });
            }

            let ext = extension_of(path)
                .map(|e| format!(".{}", e))
                .unwrap_or_default();
            *file_types.entry(ext).or_insert(0) += 1;
        }

        let file_count = files.len();
        let avg_file_size = if file_count > 0 {
            total_size / file_count
        } else {
            0
        };

        CodebaseStats {
            file_count,
            total_lines,
            file_types,
            avg_file_size,
            largest_file: largest,
            primary_language: detect_primary_language(files.paths()),
            technologies: detect_technologies(files),
        }
    }
}

/// Infer the primary language from file paths.
///
/// Counts files per language via the extension table and picks the
/// language with the most files. If any other language's count exceeds
/// 70% of the winner's, the result is `"Multiple"`; ties are
/// intentionally ambiguous. No recognized extension yields `"Unknown"`.
pub fn detect_primary_language<'a>(paths: impl Iterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for path in paths {
        if let Some(ext) = extension_of(path)
            && let Some((_, lang)) = LANGUAGE_TABLE.iter().find(|(e, _)| *e == ext)
        {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }

    let Some((&winner, &max_count)) = counts.iter().max_by_key(|&(_, &count)| count) else {
        return "Unknown".to_string();
    };

    let has_rival = counts
        .iter()
        .any(|(&lang, &count)| lang != winner && count as f64 > max_count as f64 * MULTIPLE_LANGUAGE_RATIO);

    if has_rival {
        "Multiple".to_string()
    } else {
        winner.to_string()
    }
}

/// Derive a bounded technology list from build markers and detected languages
fn detect_technologies(files: &FileSet) -> Vec<String> {
    let mut technologies: Vec<String> = Vec::new();

    for path in files.paths() {
        let filename = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if let Some((_, tech)) = TECHNOLOGY_MARKERS.iter().find(|(m, _)| *m == filename)
            && !technologies.contains(&tech.to_string())
        {
            technologies.push(tech.to_string());
        }
    }

    // Languages present, most files first
    let mut lang_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for path in files.paths() {
        if let Some(ext) = extension_of(path)
            && let Some((_, lang)) = LANGUAGE_TABLE.iter().find(|(e, _)| *e == ext)
        {
            *lang_counts.entry(lang).or_insert(0) += 1;
        }
    }
    let mut languages: Vec<(&str, usize)> = lang_counts.into_iter().collect();
    languages.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    for (lang, _) in languages {
        if !technologies.contains(&lang.to_string()) {
            technologies.push(lang.to_string());
        }
    }

    technologies.truncate(MAX_TECHNOLOGIES);
    technologies
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fileset(entries: &[(&str, &str)]) -> FileSet {
        entries.iter().map(|(p, c)| (*p, *c)).collect()
    }

    #[test]
    fn test_total_lines_is_newlines_plus_one_per_file() {
        let files = fileset(&[("a.py", "one\ntwo\nthree"), ("b.py", "single line")]);
        let stats = StructureAnalyzer::analyze(&files);
        assert_eq!(stats.total_lines, 3 + 1);
        assert_eq!(stats.file_count, 2);
    }

    #[test]
    fn test_extension_histogram() {
        let files = fileset(&[("a.py", "x"), ("b.py", "y"), ("c.rs", "z")]);
        let stats = StructureAnalyzer::analyze(&files);
        assert_eq!(stats.file_types.get(".py"), Some(&2));
        assert_eq!(stats.file_types.get(".rs"), Some(&1));
    }

    #[test]
    fn test_largest_and_average_file_size() {
        let files = fileset(&[("small.py", "ab"), ("large.py", "abcdef")]);
        let stats = StructureAnalyzer::analyze(&files);
        let largest = stats.largest_file.unwrap();
        assert_eq!(largest.path, "large.py");
        assert_eq!(largest.size, 6);
        assert_eq!(stats.avg_file_size, 4);
    }

    #[test]
    fn test_single_dominant_language() {
        let files = fileset(&[("a.py", "x"), ("b.py", "x"), ("c.py", "x"), ("d.js", "x")]);
        let stats = StructureAnalyzer::analyze(&files);
        // 1 JS file is not > 70% of 3 Python files
        assert_eq!(stats.primary_language, "Python");
    }

    #[test]
    fn test_rival_language_reports_multiple() {
        let files = fileset(&[
            ("a.py", "x"),
            ("b.py", "x"),
            ("c.py", "x"),
            ("d.js", "x"),
            ("e.js", "x"),
            ("f.js", "x"),
        ]);
        let stats = StructureAnalyzer::analyze(&files);
        assert_eq!(stats.primary_language, "Multiple");
    }

    #[test]
    fn test_no_recognized_language_is_unknown() {
        let files = fileset(&[("notes.md", "# hi"), ("data.json", "{}")]);
        let stats = StructureAnalyzer::analyze(&files);
        assert_eq!(stats.primary_language, "Unknown");
    }

    #[test]
    fn test_technologies_from_markers() {
        let files = fileset(&[
            ("package.json", "{\"name\": \"x\"}"),
            ("src/index.js", "console.log(1)"),
        ]);
        let stats = StructureAnalyzer::analyze(&files);
        assert!(stats.technologies.contains(&"Node.js".to_string()));
        assert!(stats.technologies.contains(&"JavaScript".to_string()));
    }

    proptest! {
        /// Language inference is a pure function: repeated calls agree
        #[test]
        fn prop_language_inference_deterministic(
            paths in proptest::collection::vec("[a-z]{1,8}\\.(py|js|rs|go|md)", 0..30)
        ) {
            let first = detect_primary_language(paths.iter().map(String::as_str));
            let second = detect_primary_language(paths.iter().map(String::as_str));
            prop_assert_eq!(first, second);
        }

        /// total_lines always equals the sum of per-file newline counts + 1
        #[test]
        fn prop_total_lines_sum_rule(
            contents in proptest::collection::vec("[a-z\\n]{0,40}", 1..10)
        ) {
            let mut files = FileSet::new();
            let mut expected: u64 = 0;
            for (i, content) in contents.iter().enumerate() {
                if files.insert(format!("f{}.py", i), content.clone()) {
                    expected += content.matches('\n').count() as u64 + 1;
                }
            }
            let stats = StructureAnalyzer::analyze(&files);
            prop_assert_eq!(stats.total_lines, expected);
        }
    }
}
