//! Command-line interface definitions for Capsule Scrape.
//!
//! All options have defaults; most can also be set through environment
//! variables.

use crate::utils::{parse_domain, parse_http_url};
use clap::Parser;
use std::path::PathBuf;

/// Default listing page: the Vertuo capsule range.
pub const DEFAULT_LISTING_URL: &str = "https://nespresso.com/tw/en/order/capsules/vertuo";

/// Site prefix for product pages and image paths found in the catalog.
pub const DEFAULT_DOMAIN: &str = "https://nespresso.com";

/// Scrape capsules and save simplified JSON.
///
/// # Examples
///
/// ```sh
/// # Default Vertuo listing into ./data.json
/// capsule_scrape
///
/// # Another listing page, custom output, debug logging
/// capsule_scrape -u https://nespresso.com/tw/en/order/capsules/original -o original.json -d
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page URL to start scraping
    #[arg(short, long, env = "CAPSULE_SCRAPE_URL", default_value = DEFAULT_LISTING_URL, value_parser = parse_http_url)]
    pub url: String,

    /// Output JSON file path
    #[arg(short, long, env = "CAPSULE_SCRAPE_OUTPUT", default_value = "data.json")]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Domain prepended to product and image paths
    #[arg(long, env = "CAPSULE_SCRAPE_DOMAIN", default_value = DEFAULT_DOMAIN, value_parser = parse_domain)]
    pub domain: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "CAPSULE_SCRAPE_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["capsule_scrape"]).unwrap();

        assert_eq!(cli.url, DEFAULT_LISTING_URL);
        assert_eq!(cli.output, PathBuf::from("data.json"));
        assert!(!cli.debug);
        assert_eq!(cli.domain, DEFAULT_DOMAIN);
        assert_eq!(cli.timeout, 10);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "capsule_scrape",
            "-u",
            "https://nespresso.com/tw/en/order/capsules/original",
            "-o",
            "/tmp/original.json",
            "-d",
        ]);

        assert_eq!(cli.url, "https://nespresso.com/tw/en/order/capsules/original");
        assert_eq!(cli.output, PathBuf::from("/tmp/original.json"));
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "capsule_scrape",
            "--url",
            "http://127.0.0.1:8080/listing",
            "--output",
            "out.json",
            "--debug",
            "--domain",
            "http://127.0.0.1:8080/",
            "--timeout",
            "3",
        ]);

        assert_eq!(cli.url, "http://127.0.0.1:8080/listing");
        assert_eq!(cli.domain, "http://127.0.0.1:8080");
        assert_eq!(cli.timeout, 3);
    }

    #[test]
    fn test_cli_rejects_bad_url() {
        assert!(Cli::try_parse_from(["capsule_scrape", "--url", "not a url"]).is_err());
    }
}
