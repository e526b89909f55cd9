// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, to stderr)
// 2. Parse command-line arguments using clap
// 3. Build a validated CrawlConfig and the HTTP fetcher
// 4. Run the crawl (or inspect a single page) and print the results
// 5. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated crawl configuration
mod crawl;    // src/crawl/ - the crawl engine
mod extract;  // src/extract/ - link and asset extraction
mod fetch;    // src/fetch/ - downloading pages
mod output;   // src/output.rs - manifest serialization and files

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{AssetArgs, Cli, Commands};
use config::{parse_asset_spec, CrawlConfig, IterationBudget};
use crawl::{CrawlEngine, CrawlReport, Termination};
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so that --json output on stdout stays machine-readable.
// RUST_LOG overrides the default "info" level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = crawl finished, every page fetched fine
//   Ok(1) = crawl finished, some pages could not be fetched or parsed
//   Err   = bad configuration or an output file couldn't be written
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            root_url,
            assets,
            max_iterations,
            concurrency,
            timeout_secs,
            user_agent,
            resolve_relative,
            out,
            json,
        } => {
            let mut config = build_config(&root_url, &assets, max_iterations)?
                .with_concurrency(concurrency)
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_relative_resolution(resolve_relative);
            if let Some(user_agent) = user_agent {
                config = config.with_user_agent(user_agent);
            }

            handle_crawl(config, out, json).await
        }
        Commands::Inspect { url, assets, json } => {
            let config = build_config(&url, &assets, IterationBudget::default())?;
            handle_inspect(config, url.trim(), json).await
        }
    }
}

fn build_config(root: &str, assets: &AssetArgs, budget: IterationBudget) -> Result<CrawlConfig> {
    CrawlConfig::new(root, parse_asset_spec(&assets.spec), budget).context("invalid configuration")
}

async fn handle_crawl(config: CrawlConfig, out: Option<std::path::PathBuf>, json: bool) -> Result<i32> {
    let fetcher = HttpFetcher::new(&config).context("failed to create HTTP client")?;
    let engine = CrawlEngine::new(config, fetcher);

    // Keep stdout pure JSON when --json is set
    if !json {
        println!("🔍 Crawling: {}", engine.config().root());
        println!("🧩 Assets: {}", engine.config().asset_spec().join(", "));
        println!("📊 Max iterations: {}", engine.config().budget());
    }

    let report = engine.run().await;

    if json {
        println!("{}", output::manifest_json(&report.manifest)?);
    } else {
        print_table(&report);
    }

    if let Some(dir) = out {
        let (manifest_path, urls_path) = output::write_outputs(&dir, &report)?;
        info!(manifest = %manifest_path.display(), urls = %urls_path.display(), "results written");
    }

    if report.failed_pages > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// The page is fetched exactly as typed; only the domain root gets the
// trailing slash.
async fn handle_inspect(config: CrawlConfig, url: &str, json: bool) -> Result<i32> {
    let fetcher = HttpFetcher::new(&config).context("failed to create HTTP client")?;
    let engine = CrawlEngine::new(config, fetcher);

    let refs = engine
        .inspect(url)
        .await
        .with_context(|| format!("could not inspect {}", url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&refs)?);
        return Ok(0);
    }

    println!("🔗 Links ({}):", refs.links.len());
    for link in &refs.links {
        println!("   {}", link);
    }
    println!("🧩 Assets ({}):", refs.assets.len());
    for asset in &refs.assets {
        println!("   {}", asset);
    }

    Ok(0)
}

// Prints one row per crawled page with its asset count
fn print_table(report: &CrawlReport) {
    println!();
    println!("{:<80} {:>8}", "PAGE", "ASSETS");
    println!("{}", "=".repeat(89));

    for entry in &report.manifest {
        // Truncate long URLs so the columns line up
        let page = if entry.url.chars().count() > 77 {
            let short: String = entry.url.chars().take(77).collect();
            format!("{}...", short)
        } else {
            entry.url.clone()
        };
        println!("{:<80} {:>8}", page, entry.assets.len());
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", report.manifest.len());
    println!("   🔗 URLs discovered: {}", report.visited.len());
    println!(
        "   🧩 Assets found: {}",
        report.manifest.iter().map(|entry| entry.assets.len()).sum::<usize>()
    );
    println!("   ⚠️  Failed pages: {}", report.failed_pages);
    println!("   🔁 Iterations: {} ({})", report.iterations, describe(report.termination));
}

fn describe(termination: Termination) -> &'static str {
    match termination {
        Termination::FrontierExhausted => "no more links left",
        Termination::BudgetReached => "iteration limit reached",
    }
}
