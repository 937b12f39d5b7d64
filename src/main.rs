//! guidepress - static generator for category-organized technical guides.

mod build;
mod cli;
mod config;
mod content;
mod generator;
mod init;
mod serve;
mod utils;
mod watch;

use anyhow::{Result, bail};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use content::GuideIndex;
use init::new_site;
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Init { name } => new_site(config, name.is_some()),
        Commands::Build { .. } => build_site(config).map(|_| ()),
        Commands::Serve { .. } => {
            build_site(config)?;
            serve_site(config)
        }
        Commands::List => list_guides(config),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

/// Print every guide route grouped by category, in index order.
fn list_guides(config: &SiteConfig) -> Result<()> {
    let index = GuideIndex::build(config)?;
    if index.is_empty() {
        println!("no guides under {}", config.build.content.display());
        return Ok(());
    }
    let categories = index.by_category();

    for (category, guides) in categories.iter() {
        println!("{category} ({})", guides.len());
        for guide in guides {
            println!(
                "  {}  {}  {}",
                guide.date,
                config.guide_path(&guide.category, &guide.slug),
                guide.title
            );
        }
    }
    println!("{} guides in {} categories", categories.guide_count(), categories.len());
    Ok(())
}
