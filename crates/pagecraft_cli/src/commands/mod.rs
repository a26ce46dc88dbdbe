//! CLI command definitions.
//!
//! This module defines the command structure for the pagecraft CLI.
//! Each subcommand composes the layout first, so a broken template set stops
//! the command before any page is touched.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use pagecraft_templates::{Composer, Renderer};

use crate::config::{SiteConfig, SourceKind};

pub mod build;
pub mod check;
pub mod list;
pub mod render;

/// pagecraft - render HTML pages from shared template fragments
#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(version, about = "pagecraft - render HTML pages from shared template fragments")]
#[command(long_about = r#"
pagecraft composes every template fragment matching the configured patterns
into one layout, then renders pages against it.

COMMANDS:
  list    → Show the fragments in the composed layout
  check   → Compose the layout and report errors
  render  → Render one page to stdout or a file
  build   → Render every page into the output directory

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Configuration file (defaults to ./pagecraft.toml when present)
    #[arg(short, long, global = true, env = "PAGECRAFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template backend
    #[arg(long, global = true, value_enum, env = "PAGECRAFT_SOURCE")]
    pub source: Option<SourceKind>,

    /// Templates directory for the disk backend
    #[arg(long, global = true, env = "PAGECRAFT_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Template glob pattern, matched against file names (repeatable)
    #[arg(short = 'p', long = "pattern", global = true)]
    pub patterns: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the fragments of the composed layout
    List(list::ListArgs),

    /// Compose the layout and report any error
    Check(check::CheckArgs),

    /// Render a single page
    Render(render::RenderArgs),

    /// Render all pages into the output directory
    Build(build::BuildArgs),
}

impl Cli {
    /// Resolve the effective configuration: file first, then flags.
    pub fn site_config(&self) -> Result<SiteConfig> {
        let current_dir = std::env::current_dir()?;
        let mut config = SiteConfig::discover(self.config.as_deref(), &current_dir)?;

        if let Some(source) = self.source {
            config = config.with_source(source);
        }
        if let Some(dir) = &self.templates_dir {
            config = config.with_templates_dir(dir);
        }
        if !self.patterns.is_empty() {
            config = config.with_patterns(self.patterns.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Compose the layout described by `config` and wrap it in a renderer.
pub fn load_renderer(config: &SiteConfig) -> Result<Renderer> {
    let source = config.template_source();
    let composer = Composer::new(&config.patterns)?;
    let layout = composer
        .compose(source.as_ref())
        .with_context(|| format!("Failed to compose templates from {} source", source.kind()))?;

    info!(
        "Layout ready: {} fragment(s), primary {}",
        layout.len(),
        layout.primary()
    );
    Ok(Renderer::new(layout))
}
