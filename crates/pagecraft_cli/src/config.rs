//! Site configuration.
//!
//! Values come from `pagecraft.toml` (when present) and can be overridden by
//! command-line flags or `PAGECRAFT_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use pagecraft_source::{DiskSource, EmbeddedSource, FileSource};

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "pagecraft.toml";

/// Templates compiled into the binary.
static EMBEDDED_TEMPLATES: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where layout templates are read from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Templates bundled into the binary at build time
    #[default]
    Embedded,
    /// Templates read from `templates_dir` at run time
    Disk,
}

/// Site configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Template backend
    pub source: SourceKind,
    /// Layout directory for the disk backend
    pub templates_dir: PathBuf,
    /// Base-name glob patterns selecting template files
    pub patterns: Vec<String>,
    /// Directory holding page fragments
    pub pages_dir: PathBuf,
    /// Directory `build` writes rendered pages to
    pub output_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            templates_dir: PathBuf::from("templates"),
            patterns: vec!["*.html".to_string()],
            pages_dir: PathBuf::from("pages"),
            output_dir: PathBuf::from("public"),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {:?}", path);
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else `pagecraft.toml` in `dir` if it exists,
    /// else the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = dir.join(CONFIG_FILE);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            debug!("No {} found, using defaults", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_pages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pages_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Check the configuration before anything is composed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one template pattern is required".to_string(),
            ));
        }

        if self.source == SourceKind::Disk && !self.templates_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "templates directory not found: {:?}",
                self.templates_dir
            )));
        }

        Ok(())
    }

    /// Instantiate the configured template backend.
    pub fn template_source(&self) -> Arc<dyn FileSource> {
        match self.source {
            SourceKind::Embedded => Arc::new(EmbeddedSource::new(&EMBEDDED_TEMPLATES)),
            SourceKind::Disk => Arc::new(DiskSource::new(&self.templates_dir)),
        }
    }

    /// Source for page fragments. Pages always live on disk.
    pub fn page_source(&self) -> DiskSource {
        DiskSource::new(&self.pages_dir)
    }
}
