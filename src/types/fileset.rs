//! FileSet - the in-memory source tree for one project
//!
//! A FileSet maps relative file paths to full text content. It is the input
//! artifact to every analysis stage and is never persisted directly.
//!
//! Invariants enforced at construction:
//! - keys are forward-slash normalized with no leading slash
//! - every key passes the extension allow-list
//! - empty/whitespace-only contents are dropped

use std::collections::BTreeMap;

/// Extensions accepted into a FileSet
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "py", "java", "cpp", "c", "h", "cs", "php", "rb", "go", "rs",
    "swift", "kt", "html", "css", "scss", "sass", "less", "json", "xml", "yml", "yaml", "md",
    "txt", "sh", "bash",
];

/// Check whether a path's extension is on the allow-list
pub fn is_allowed_extension(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercased extension of a path, without the dot
pub fn extension_of(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// In-memory mapping from relative file path to full text content.
///
/// Backed by a BTreeMap so iteration order is path-sorted and every
/// analysis stage sees the files in the same deterministic order.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: BTreeMap<String, String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, applying path normalization and the allow-list filter.
    ///
    /// Returns true if the file was accepted.
    pub fn insert(&mut self, path: impl AsRef<str>, content: impl Into<String>) -> bool {
        let normalized = normalize_path(path.as_ref());
        if normalized.is_empty() || !is_allowed_extension(&normalized) {
            return false;
        }

        let content = content.into();
        if content.trim().is_empty() {
            return false;
        }

        self.files.insert(normalized, content);
        true
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate (path, content) pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// All paths in path order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl<P: AsRef<str>, C: Into<String>> FromIterator<(P, C)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for (path, content) in iter {
            set.insert(path, content);
        }
        set
    }
}

/// Normalize a relative path: backslashes to forward slashes, no leading slash
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_normalizes_paths() {
        let mut files = FileSet::new();
        assert!(files.insert("/src\\main.py", "print('hi')"));
        assert!(files.contains("src/main.py"));
    }

    #[test]
    fn test_insert_rejects_disallowed_extension() {
        let mut files = FileSet::new();
        assert!(!files.insert("binary.exe", "MZ"));
        assert!(!files.insert("noext", "data"));
        assert!(files.insert("readme.MD", "# hi"));
    }

    #[test]
    fn test_insert_rejects_empty_content() {
        let mut files = FileSet::new();
        assert!(!files.insert("empty.py", ""));
        assert!(!files.insert("blank.py", "   \n\t  "));
        assert!(files.is_empty());
    }

    #[test]
    fn test_iteration_is_path_ordered() {
        let files: FileSet = [("b.py", "b"), ("a.py", "a"), ("c.py", "c")]
            .into_iter()
            .collect();
        let paths: Vec<&str> = files.paths().collect();
        assert_eq!(paths, vec!["a.py", "b.py", "c.py"]);
    }
}
