use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

mod app;
mod config;
mod domain;
mod error;
mod export;
mod infra;
mod logging;
mod observability;
mod pipeline;
mod sources;

use crate::app::run_pipeline_use_case::{RunPipelineUseCase, RunSummary};
use crate::config::AgentConfig;
use crate::domain::{RawListing, SourceSite};
use crate::infra::link_check::HttpLinkChecker;
use crate::infra::mailbox::FileMailbox;
use crate::sources::scrapers::{BizBuySellScraper, BizQuestScraper, ManualSource};

#[derive(Parser)]
#[command(name = "dealscout")]
#[command(about = "Business-for-sale listing aggregator and screening pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full aggregation pass over all configured sources
    Run {
        /// Path to the TOML configuration file
        #[arg(long, short, default_value = "config.toml")]
        config: PathBuf,
        /// Specific sites to run (comma-separated). Available: bizbuysell, bizquest, manual
        #[arg(long)]
        sources: Option<String>,
        /// Skip link validation (no network calls for listing URLs)
        #[arg(long)]
        skip_link_check: bool,
    },
    /// Re-screen a previously captured raw listing file, without any network
    Screen {
        /// Path to the TOML configuration file
        #[arg(long, short, default_value = "config.toml")]
        config: PathBuf,
        /// JSON file containing an array of raw listings
        input: PathBuf,
    },
}

fn site_enabled(filter: &Option<Vec<SourceSite>>, site: SourceSite) -> bool {
    match filter {
        Some(sites) => sites.contains(&site),
        None => true,
    }
}

fn build_run_use_case(
    config: AgentConfig,
    sources: Option<String>,
    skip_link_check: bool,
) -> RunPipelineUseCase {
    let filter: Option<Vec<SourceSite>> = sources.map(|list| {
        list.split(',')
            .filter_map(|tag| {
                let site = SourceSite::from_tag(tag);
                if site.is_none() {
                    println!("⚠️  Unknown source: {}", tag.trim());
                }
                site
            })
            .collect()
    });

    let mut use_case = RunPipelineUseCase::new(config.clone());

    if !config.mailbox.spool_path.is_empty() {
        use_case = use_case.with_mailbox(Box::new(FileMailbox::new(&config.mailbox.spool_path)));
    }
    if let Some(site_config) = &config.scrape.bizbuysell {
        if site_enabled(&filter, SourceSite::BizBuySell) {
            use_case =
                use_case.with_source(Box::new(BizBuySellScraper::new(site_config.clone())));
        }
    }
    if let Some(site_config) = &config.scrape.bizquest {
        if site_enabled(&filter, SourceSite::BizQuest) {
            use_case = use_case.with_source(Box::new(BizQuestScraper::new(site_config.clone())));
        }
    }
    if !config.scrape.manual_path.is_empty() && site_enabled(&filter, SourceSite::Manual) {
        use_case = use_case.with_source(Box::new(ManualSource::new(&config.scrape.manual_path)));
    }
    if !skip_link_check {
        use_case =
            use_case.with_link_checker(Box::new(HttpLinkChecker::new(&config.link_check)));
    }

    use_case
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Run Results:");
    println!("   Parsed: {}", summary.parsed);
    println!("   Kept: {}", summary.kept);
    println!("   Rejects: {}", summary.rejects);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            sources,
            skip_link_check,
        } => {
            println!("🔄 Running aggregation pipeline...");
            let config = AgentConfig::load(&config)?;

            let use_case = build_run_use_case(config, sources, skip_link_check);
            match use_case.execute().await {
                Ok(summary) => {
                    info!("Pipeline finished");
                    print_summary(&summary);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Screen { config, input } => {
            println!("🔎 Screening captured listings...");
            let config = AgentConfig::load(&config)?;

            let content = std::fs::read_to_string(&input)?;
            let listings: Vec<RawListing> = serde_json::from_str(&content)?;
            println!("   Loaded {} raw listings from {}", listings.len(), input.display());

            let use_case = RunPipelineUseCase::new(config).with_seed_listings(listings);
            match use_case.execute().await {
                Ok(summary) => {
                    info!("Screening finished");
                    print_summary(&summary);
                }
                Err(e) => {
                    error!("Screening failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}
