//! Render command - Render a single page against the layout.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::commands::load_renderer;
use crate::config::SiteConfig;
use crate::data::load_data;

#[derive(Args)]
pub struct RenderArgs {
    /// Page to render, relative to the pages directory
    page: String,

    /// Register the page under this name instead of its path
    #[arg(short, long)]
    name: Option<String>,

    /// JSON or YAML file with the page data
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Pages directory (overrides the configuration)
    #[arg(long)]
    pages_dir: Option<PathBuf>,
}

pub async fn execute(args: RenderArgs, config: SiteConfig) -> Result<()> {
    let config = match args.pages_dir {
        Some(dir) => config.with_pages_dir(dir),
        None => config,
    };

    let renderer = load_renderer(&config)?;
    let data = load_data(args.data.as_deref())?;
    let pages = config.page_source();
    let name = args.name.as_deref().unwrap_or(&args.page);

    info!("Rendering {} as {}", args.page, name);

    match &args.out {
        Some(path) => {
            // Buffer so a failed render never leaves a truncated file behind.
            let mut buffer = Vec::new();
            renderer
                .render_as(&pages, &args.page, name, &data, &mut buffer)
                .with_context(|| format!("Failed to render page {}", args.page))?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, buffer)
                .with_context(|| format!("Failed to write output {:?}", path))?;
            println!("✅ Rendered {} → {}", args.page, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            renderer
                .render_as(&pages, &args.page, name, &data, &mut sink)
                .with_context(|| format!("Failed to render page {}", args.page))?;
            sink.flush()?;
        }
    }

    Ok(())
}
