//! Error types for template composition and rendering.

use pagecraft_source::SourceError;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while composing or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No templates discovered")]
    EmptySet,

    #[error("Failed to parse template {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to link template {name}: {message}")]
    Link { name: String, message: String },

    #[error("Empty layout")]
    EmptyLayout,

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Failed to execute template {name}: {source}")]
    Execution {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("At least one glob pattern is required")]
    NoPatterns,
}

impl TemplateError {
    /// Classify an error raised while adding templates to a Tera instance.
    ///
    /// Tera reports syntax errors as a message chained onto the underlying
    /// parser error; inheritance and macro-import problems carry no source.
    pub(crate) fn from_tera_add(name: &str, err: tera::Error) -> Self {
        use std::error::Error as _;

        match &err.kind {
            tera::ErrorKind::MissingParent { current, parent } => TemplateError::Link {
                name: current.clone(),
                message: format!("extends {:?}, which is not in the set", parent),
            },
            tera::ErrorKind::CircularExtend {
                tpl,
                inheritance_chain,
            } => TemplateError::Link {
                name: tpl.clone(),
                message: format!("circular extends: {}", inheritance_chain.join(" -> ")),
            },
            _ if err.source().is_some() => TemplateError::Parse {
                path: name.to_string(),
                source: err,
            },
            _ => TemplateError::Link {
                name: name.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Whether this is a syntax error in a single fragment.
    pub fn is_parse(&self) -> bool {
        matches!(self, TemplateError::Parse { .. })
    }
}
