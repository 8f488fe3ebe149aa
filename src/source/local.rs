//! Local Directory Loader
//!
//! Walks a directory into a FileSet, honoring gitignore rules, skipping
//! vendored/build directories, and applying the extension allow-list and
//! a per-file size cap.

use std::path::Path;

use ignore::WalkBuilder;
use tracing::debug;

use crate::constants::ingest;
use crate::types::{FileSet, Result, ScopeError, is_allowed_extension};

/// Directories never worth ingesting
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "target",
    ".git",
    "build",
    "dist",
    "__pycache__",
    "vendor",
    ".venv",
];

/// Load a directory tree into a FileSet.
///
/// Paths in the result are relative to `root`, forward-slash normalized.
/// Binary-ish content survives via lossy UTF-8 conversion; files over the
/// size cap or off the allow-list are skipped.
pub fn load_dir(root: &Path) -> Result<FileSet> {
    if !root.is_dir() {
        return Err(ScopeError::InvalidInput(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !SKIP_DIRS.contains(&name.as_ref())
        })
        .build();

    let mut files = FileSet::new();
    let mut skipped = 0usize;

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if !is_allowed_extension(&relative) {
            skipped += 1;
            continue;
        }

        match entry.metadata() {
            Ok(meta) if meta.len() > ingest::MAX_FILE_SIZE => {
                debug!("Skipping oversized file: {}", relative);
                skipped += 1;
                continue;
            }
            Err(e) => {
                debug!("Skipping {}: {}", relative, e);
                continue;
            }
            _ => {}
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping {}: {}", relative, e);
                continue;
            }
        };
        let content = String::from_utf8_lossy(&bytes).into_owned();
        if !files.insert(&relative, content) {
            skipped += 1;
        }
    }

    debug!(
        "Loaded {} files from {} ({} skipped)",
        files.len(),
        root.display(),
        skipped
    );
    Ok(files)
}
