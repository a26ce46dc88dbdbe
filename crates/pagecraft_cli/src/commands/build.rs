//! Build command - Render every page into the output directory.
//!
//! Pages are rendered concurrently on blocking tasks. They all share one
//! layout; each render works on its own clone of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use pagecraft_source::{DiskSource, FileSource};
use pagecraft_templates::{Composer, Renderer};

use crate::commands::load_renderer;
use crate::config::SiteConfig;
use crate::data::load_data;

#[derive(Args)]
pub struct BuildArgs {
    /// Pages directory (overrides the configuration)
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Output directory (overrides the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON or YAML file with data shared by every page
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Maximum number of pages rendered at once
    #[arg(short, long, default_value_t = 8)]
    jobs: usize,
}

pub async fn execute(args: BuildArgs, config: SiteConfig) -> Result<()> {
    let mut config = config;
    if let Some(dir) = args.pages_dir {
        config = config.with_pages_dir(dir);
    }
    if let Some(dir) = args.output {
        config = config.with_output_dir(dir);
    }

    let renderer = load_renderer(&config)?;
    let composer = Composer::new(&config.patterns)?;
    let data = Arc::new(load_data(args.data.as_deref())?);
    let pages = Arc::new(config.page_source());
    let output_dir = Arc::new(config.output_dir.clone());

    let page_paths: Vec<String> = pages
        .list("")
        .with_context(|| format!("Failed to list pages in {:?}", config.pages_dir))?
        .into_iter()
        .filter(|entry| !entry.is_dir && composer.matches(entry.base_name()))
        .map(|entry| entry.path)
        .collect();

    if page_paths.is_empty() {
        warn!("No pages found in {:?}", config.pages_dir);
        println!("⚠️  No pages found to render");
        return Ok(());
    }

    info!(
        "Rendering {} page(s) into {:?}",
        page_paths.len(),
        output_dir
    );
    println!("🔨 Rendering {} page(s)...\n", page_paths.len());

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for page in page_paths {
        let permit = semaphore.clone().acquire_owned().await?;
        let renderer = renderer.clone();
        let pages = Arc::clone(&pages);
        let data = Arc::clone(&data);
        let output_dir = Arc::clone(&output_dir);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = render_page(&renderer, &pages, &page, &data, &output_dir);
            (page, result)
        });
    }

    let mut passed = 0;
    let mut failures = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let (page, result) = joined?;
        match result {
            Ok(path) => {
                passed += 1;
                println!("✅ {} → {}", page, path.display());
            }
            Err(e) => {
                println!("❌ {}: {:#}", page, e);
                failures.push(e);
            }
        }
    }

    println!();
    println!("Results: {} rendered, {} failed", passed, failures.len());

    let failed = failures.len();
    match failures.into_iter().next() {
        Some(first) => Err(first.context(format!("{} page(s) failed to render", failed))),
        None => Ok(()),
    }
}

/// Render one page fully in memory, then write it under `output_dir`.
fn render_page(
    renderer: &Renderer,
    pages: &DiskSource,
    page: &str,
    data: &Value,
    output_dir: &Path,
) -> Result<PathBuf> {
    let mut buffer = Vec::new();
    renderer
        .render(pages, page, data, &mut buffer)
        .with_context(|| format!("Failed to render page {}", page))?;

    let target = output_dir.join(page);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &buffer).with_context(|| format!("Failed to write {:?}", target))?;
    debug!("Wrote {} bytes to {:?}", buffer.len(), target);

    Ok(target)
}
