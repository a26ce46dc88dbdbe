//! List command - Show the composed layout.

use anyhow::Result;
use clap::Args;

use crate::commands::load_renderer;
use crate::config::SiteConfig;

#[derive(Args)]
pub struct ListArgs {
    /// Print names only, one per line
    #[arg(long)]
    names_only: bool,
}

pub async fn execute(args: ListArgs, config: SiteConfig) -> Result<()> {
    let renderer = load_renderer(&config)?;
    let Some(layout) = renderer.layout() else {
        anyhow::bail!("Empty layout");
    };

    if args.names_only {
        for name in layout.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    println!("📦 Layout ({} fragments)", layout.len());
    for name in layout.names() {
        let marker = if name == layout.primary() { "★" } else { " " };
        println!("  {} {}", marker, name);
    }

    Ok(())
}
