//! Error types for file sources.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for file source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while listing or reading a file source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8: {path}")]
    InvalidUtf8 { path: String },

    #[error("Failed to walk {root:?}: {message}")]
    Walk { root: PathBuf, message: String },

    #[error("Invalid source path: {0}")]
    InvalidPath(String),
}

impl SourceError {
    /// Path the error refers to, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            SourceError::NotFound { path }
            | SourceError::Io { path, .. }
            | SourceError::InvalidUtf8 { path }
            | SourceError::InvalidPath(path) => Some(path.as_str()),
            SourceError::Walk { .. } => None,
        }
    }

    /// Whether the error means the path simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}
