//! # Capsule Scrape
//!
//! Extracts capsule ranges, caffeine content and image URLs from the JSON a
//! retailer embeds in its server-rendered pages, and writes them as one
//! simplified JSON document grouped by range.
//!
//! ## Usage
//!
//! ```sh
//! capsule_scrape --url https://nespresso.com/tw/en/order/capsules/vertuo --output data.json
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential pipeline:
//! 1. **Listing**: fetch the category page and read its embedded catalog
//! 2. **Filtering**: keep capsule ranges and their single-capsule products
//! 3. **Detail**: fetch each product page for caffeine and image data
//! 4. **Output**: write the grouped result to a JSON file
//!
//! Catalog or output failures exit with status 2. A failed product page only
//! drops that product.

use clap::Parser;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod errors;
mod extract;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use errors::ScrapeError;
use fetch::{HttpFetcher, RetryFetch, RetryPolicy, build_client};
use outputs::json;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    // --- Tracing init ---
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    debug!(?args, "Parsed CLI arguments");

    match run(&args, RetryPolicy::default()).await {
        Ok(ranges) => {
            let elapsed = start_time.elapsed();
            info!(ranges, ?elapsed, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Error");
            ExitCode::from(2)
        }
    }
}

/// Run the whole pipeline and return the number of ranges written.
///
/// Nothing is written unless the catalog loads; item-level failures are
/// absorbed by the detail scraper.
#[instrument(level = "info", skip_all, fields(url = %args.url, output = %args.output.display()))]
async fn run(args: &Cli, policy: RetryPolicy) -> Result<usize, ScrapeError> {
    let client = build_client(Duration::from_secs(args.timeout))?;
    let fetcher = RetryFetch::new(HttpFetcher::new(&client), policy);

    let catalog = scrapers::listing::load_catalog(&fetcher, &args.url).await?;
    let simple_data = scrapers::collect_ranges(&fetcher, &args.domain, &catalog).await;
    json::write_simple_data(&simple_data, &args.output).await?;

    Ok(simple_data.len())
}
