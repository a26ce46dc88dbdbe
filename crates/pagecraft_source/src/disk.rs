//! Live filesystem backend.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SourceError, SourceResult};
use crate::source::{normalize_path, FileSource, SourceEntry};

/// File source reading from a directory on disk at request time.
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    /// Create a source rooted at `root`. The directory is not checked until used.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> SourceResult<(String, PathBuf)> {
        let rel = normalize_path(path)?;
        let full = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&rel)
        };
        Ok((rel, full))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl FileSource for DiskSource {
    fn kind(&self) -> &'static str {
        "disk"
    }

    fn list(&self, root: &str) -> SourceResult<Vec<SourceEntry>> {
        let (rel, base) = self.resolve(root)?;

        let metadata = fs::metadata(&base).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound { path: rel.clone() },
            _ => SourceError::Io {
                path: rel.clone(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Ok(vec![SourceEntry::file(rel)]);
        }

        debug!("Listing {:?}", base);

        let mut entries = Vec::new();
        for entry in WalkDir::new(&base).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| SourceError::Walk {
                root: base.clone(),
                message: e.to_string(),
            })?;

            let Some(path) = self.relative(entry.path()) else {
                continue;
            };
            entries.push(SourceEntry {
                path,
                is_dir: entry.file_type().is_dir(),
            });
        }

        Ok(entries)
    }

    fn read(&self, path: &str) -> SourceResult<Vec<u8>> {
        let (rel, full) = self.resolve(path)?;
        fs::read(&full).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound { path: rel },
            _ => SourceError::Io {
                path: rel,
                source: e,
            },
        })
    }
}
