// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl:   crawl a site and build the per-page asset manifest
// - inspect: fetch one page and show its links and assets
//
// Rust concepts:
// - Derive macros: #[derive(Parser)] generates all the parsing code
// - FromStr: IterationBudget parses itself, so clap can use it directly
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{IterationBudget, DEFAULT_ASSET_SPEC};

#[derive(Parser, Debug)]
#[command(
    name = "asset-crawler",
    version,
    about = "Crawl a website and list the assets every page uses",
    long_about = "asset-crawler walks every page under a root URL, following only links that stay \
                  inside it, and records which stylesheets, scripts and images each page references."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and build the asset manifest
    ///
    /// Example: asset-crawler crawl https://example.com --max-iterations 3 --out ./report
    Crawl {
        /// Root URL; only links starting with it are followed
        root_url: String,

        #[command(flatten)]
        assets: AssetArgs,

        /// How many crawl iterations to run: a positive number, or 'unbounded' (any negative number also means unbounded)
        ///
        /// Iteration 1 visits the root, iteration 2 the pages it links to, and so on.
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        max_iterations: IterationBudget,

        /// Pages fetched in parallel within one iteration
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// User-Agent header sent with every request
        #[arg(long)]
        user_agent: Option<String>,

        /// Resolve relative links ("img/a.png", "/about", "//cdn/x.js") against the page URL (RFC 3986)
        #[arg(long)]
        resolve_relative: bool,

        /// Directory to write assets.json and urls.txt into
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the manifest as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch a single page and show its in-domain links and assets
    ///
    /// Example: asset-crawler inspect https://example.com --assets .css,.js
    Inspect {
        /// Page URL (also used as the domain root)
        url: String,

        #[command(flatten)]
        assets: AssetArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct AssetArgs {
    /// Comma-separated substrings that mark a URL as an asset
    #[arg(long = "assets", default_value = DEFAULT_ASSET_SPEC)]
    pub spec: String,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[command(flatten)]?
//    - Both subcommands take --assets; AssetArgs declares it once
//    - flatten splices its fields into each subcommand
//
// 2. How does --max-iterations accept "unbounded"?
//    - clap falls back to FromStr for types it doesn't know
//    - IterationBudget implements FromStr in config.rs
// -----------------------------------------------------------------------------
