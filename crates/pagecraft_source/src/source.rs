//! The `FileSource` capability shared by every backend.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{SourceError, SourceResult};

/// One entry produced by [`FileSource::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path relative to the source root, `/`-separated.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl SourceEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }

    /// Last path component.
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }
}

/// A read-only hierarchical resource provider.
///
/// Every implementation lists entries in the same order: a pre-order walk
/// where the children of each directory are sorted bytewise by file name
/// (see [`walk_order`]). Missing paths are always reported as
/// [`SourceError::NotFound`].
pub trait FileSource: Send + Sync + fmt::Debug {
    /// Short backend name used in logs.
    fn kind(&self) -> &'static str;

    /// List every entry below `root` (the root itself excluded).
    ///
    /// `root` of `""` or `"."` means the whole source. Returned paths are
    /// relative to the source root, not to `root`. If `root` names a file,
    /// that single file is returned.
    fn list(&self, root: &str) -> SourceResult<Vec<SourceEntry>>;

    /// Read the full contents of a file.
    fn read(&self, path: &str) -> SourceResult<Vec<u8>>;

    /// Read a file as UTF-8 text.
    ///
    /// Errors carry the normalized path, like [`SourceError::NotFound`].
    fn read_to_string(&self, path: &str) -> SourceResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8 {
            path: normalize_path(path).unwrap_or_else(|_| path.to_string()),
        })
    }
}

/// Total order used for listings: component-wise bytewise comparison.
///
/// Sorting full paths this way yields the same sequence as a pre-order walk
/// with each directory's children sorted by name, since a directory's
/// components are a prefix of its children's.
pub fn walk_order(a: &str, b: &str) -> Ordering {
    a.split('/').cmp(b.split('/'))
}

/// Last `/`-separated component of a path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Normalize a caller-supplied path into the canonical relative form.
///
/// Strips leading `./` and redundant separators. Absolute paths and `..`
/// components are rejected.
pub fn normalize_path(path: &str) -> SourceResult<String> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(SourceError::InvalidPath(path.to_string()));
    }

    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return Err(SourceError::InvalidPath(path.to_string())),
            other => parts.push(other),
        }
    }

    Ok(parts.join("/"))
}
