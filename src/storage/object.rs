//! Object Store
//!
//! Write-only artifact storage for documentation markdown and analysis
//! JSON snapshots, keyed by project-scoped path prefixes. The pipeline
//! never reads back what it wrote within the same run.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::types::{Result, ScopeError};

/// External object storage contract
pub trait ObjectStore: Send + Sync {
    /// Store content under a key, returning a reference to the stored object
    fn put(&self, content: &[u8], key: &str) -> Result<String>;

    /// Delete every object whose key starts with the prefix, returning the
    /// count removed
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Filesystem-backed object store rooted at a directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let key = key.trim_start_matches('/');
        let relative = Path::new(key);

        // Keys must stay inside the root
        if key.is_empty()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(ScopeError::Storage(format!("Invalid object key: {}", key)));
        }

        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put(&self, content: &[u8], key: &str) -> Result<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(key.trim_start_matches('/').to_string())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let prefix = prefix.trim_start_matches('/');
        if prefix.is_empty() {
            return Err(ScopeError::Storage(
                "Refusing to delete an empty prefix".to_string(),
            ));
        }

        let mut removed = 0;
        remove_matching(&self.root, &self.root, prefix, &mut removed)?;
        Ok(removed)
    }
}

fn remove_matching(root: &Path, dir: &Path, prefix: &str, removed: &mut usize) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            remove_matching(root, &path, prefix, removed)?;
            // Drop directories emptied by the removal
            if fs::read_dir(&path)?.next().is_none() {
                fs::remove_dir(&path)?;
            }
        } else {
            let key = path
                .strip_prefix(root)
                .map_err(|_| ScopeError::Storage("Path escaped object root".to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            if key.starts_with(prefix) {
                fs::remove_file(&path)?;
                *removed += 1;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (LocalObjectStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (LocalObjectStore::new(dir.path()), dir)
    }

    #[test]
    fn test_put_creates_nested_key() {
        let (store, dir) = store();
        let key = store
            .put(b"# docs", "projects/p1/documentation/generated_doc.md")
            .unwrap();
        assert_eq!(key, "projects/p1/documentation/generated_doc.md");
        assert!(dir.path().join(key).exists());
    }

    #[test]
    fn test_put_rejects_traversal() {
        let (store, _dir) = store();
        assert!(store.put(b"x", "../escape.md").is_err());
        assert!(store.put(b"x", "a/../../escape.md").is_err());
    }

    #[test]
    fn test_delete_prefix_counts_and_scopes() {
        let (store, dir) = store();
        store.put(b"a", "projects/p1/analysis/security.json").unwrap();
        store.put(b"b", "projects/p1/documentation/doc.md").unwrap();
        store.put(b"c", "projects/p2/documentation/doc.md").unwrap();

        let removed = store.delete_prefix("projects/p1/").unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("projects/p2/documentation/doc.md").exists());
    }

    #[test]
    fn test_delete_prefix_rejects_empty() {
        let (store, _dir) = store();
        assert!(store.delete_prefix("").is_err());
    }
}
