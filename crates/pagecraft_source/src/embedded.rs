//! Backend for resources compiled into the binary with `include_dir`.

use std::fmt;
use std::path::Path;

use include_dir::{Dir, DirEntry};

use crate::error::{SourceError, SourceResult};
use crate::source::{normalize_path, walk_order, FileSource, SourceEntry};

/// File source over a directory embedded at build time.
///
/// ```rust,ignore
/// use include_dir::{include_dir, Dir};
/// static TEMPLATES: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates");
/// let source = pagecraft_source::EmbeddedSource::new(&TEMPLATES);
/// ```
#[derive(Clone, Copy)]
pub struct EmbeddedSource {
    dir: &'static Dir<'static>,
}

impl EmbeddedSource {
    pub fn new(dir: &'static Dir<'static>) -> Self {
        Self { dir }
    }
}

impl fmt::Debug for EmbeddedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedSource")
            .field("entries", &self.dir.entries().len())
            .finish()
    }
}

fn path_string(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

fn collect(dir: &Dir<'_>, out: &mut Vec<SourceEntry>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => {
                out.push(SourceEntry::dir(path_string(sub.path())));
                collect(sub, out);
            }
            DirEntry::File(file) => out.push(SourceEntry::file(path_string(file.path()))),
        }
    }
}

impl FileSource for EmbeddedSource {
    fn kind(&self) -> &'static str {
        "embedded"
    }

    fn list(&self, root: &str) -> SourceResult<Vec<SourceEntry>> {
        let rel = normalize_path(root)?;

        let start = if rel.is_empty() {
            self.dir
        } else {
            match self.dir.get_entry(&rel) {
                Some(DirEntry::Dir(sub)) => sub,
                Some(DirEntry::File(_)) => return Ok(vec![SourceEntry::file(rel)]),
                None => return Err(SourceError::NotFound { path: rel }),
            }
        };

        let mut entries = Vec::new();
        collect(start, &mut entries);
        // include_dir keeps filesystem order, which is not guaranteed sorted.
        entries.sort_by(|a, b| walk_order(&a.path, &b.path));
        Ok(entries)
    }

    fn read(&self, path: &str) -> SourceResult<Vec<u8>> {
        let rel = normalize_path(path)?;
        self.dir
            .get_file(&rel)
            .map(|file| file.contents().to_vec())
            .ok_or(SourceError::NotFound { path: rel })
    }
}
