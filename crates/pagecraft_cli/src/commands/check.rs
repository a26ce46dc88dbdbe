//! Check command - Compose the layout and report the outcome.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::commands::load_renderer;
use crate::config::SiteConfig;

#[derive(Args)]
pub struct CheckArgs {}

pub async fn execute(_args: CheckArgs, config: SiteConfig) -> Result<()> {
    info!("Checking templates ({:?} source)", config.source);

    let renderer = load_renderer(&config)?;
    if let Some(layout) = renderer.layout() {
        println!(
            "✅ {} fragment(s) composed, primary {}",
            layout.len(),
            layout.primary()
        );
    }

    Ok(())
}
