//! In-memory backend, mostly for tests and programmatic setups.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{SourceError, SourceResult};
use crate::source::{normalize_path, walk_order, FileSource, SourceEntry};

/// File source backed by a map of path to contents.
///
/// Directories are implied by file paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file. Invalid paths are ignored.
    pub fn insert(&mut self, path: &str, contents: impl AsRef<[u8]>) {
        match normalize_path(path) {
            Ok(rel) if !rel.is_empty() => {
                self.files.insert(rel, Arc::from(contents.as_ref()));
            }
            _ => tracing::warn!("Ignoring invalid in-memory path: {:?}", path),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSource for MemorySource {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn list(&self, root: &str) -> SourceResult<Vec<SourceEntry>> {
        let rel = normalize_path(root)?;

        if !rel.is_empty() && self.files.contains_key(&rel) {
            return Ok(vec![SourceEntry::file(rel)]);
        }

        let prefix = if rel.is_empty() {
            String::new()
        } else {
            format!("{}/", rel)
        };

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for path in self.files.keys().filter(|p| p.starts_with(&prefix)) {
            // Every ancestor between the listing root and the file is a directory.
            let mut end = prefix.len();
            while let Some(idx) = path[end..].find('/') {
                end += idx;
                dirs.insert(path[..end].to_string());
                end += 1;
            }
            entries.push(SourceEntry::file(path.clone()));
        }

        if entries.is_empty() && !rel.is_empty() {
            return Err(SourceError::NotFound { path: rel });
        }

        entries.extend(dirs.into_iter().map(SourceEntry::dir));
        entries.sort_by(|a, b| walk_order(&a.path, &b.path));
        Ok(entries)
    }

    fn read(&self, path: &str) -> SourceResult<Vec<u8>> {
        let rel = normalize_path(path)?;
        self.files
            .get(&rel)
            .map(|contents| contents.to_vec())
            .ok_or(SourceError::NotFound { path: rel })
    }
}
