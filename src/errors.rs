//! Error taxonomy for the scrape pipeline.
//!
//! Every fallible step returns [`ScrapeError`]. Whether an error is fatal
//! depends on the call site: catalog loading and output writing abort the
//! run, while a failure on a single product detail page only skips that item.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network failure or unexpected HTTP status, after any retries.
    #[error("failed to fetch {url}{}: {reason}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
        /// Whether another attempt might succeed.
        transient: bool,
    },

    /// The page parsed but nothing matched the selector.
    #[error("selector '{selector}' not found on the page: {url}")]
    SelectorNotFound { selector: String, url: String },

    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Brace slicing found nothing, the slice was not JSON, or it was not an object.
    #[error("malformed embedded JSON on {url}: {reason}")]
    MalformedJson { url: String, reason: String },

    #[error("no products found in the listing data at {url}")]
    EmptyCatalog { url: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ScrapeError {
    /// HTTP statuses the fetcher treats as transient server errors.
    pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

    /// Build a fetch error from a `reqwest` failure that produced no status.
    ///
    /// Timeouts, connect failures and connections dropped mid-request are
    /// transient. A request that could not be built (an unparsable URL, for
    /// one) or a redirect loop fails the same way on every attempt.
    pub fn network(url: &str, err: &reqwest::Error) -> Self {
        let (kind, transient) = if err.is_builder() {
            ("invalid request", false)
        } else if err.is_redirect() {
            ("redirect failed", false)
        } else if err.is_timeout() {
            ("timed out", true)
        } else if err.is_connect() {
            ("connection failed", true)
        } else {
            ("request failed", true)
        };
        ScrapeError::Fetch {
            url: url.to_string(),
            status: None,
            reason: format!("{kind}: {err}"),
            transient,
        }
    }

    /// Build a fetch error for a response with a non-200 status.
    pub fn status(url: &str, status: u16) -> Self {
        ScrapeError::Fetch {
            url: url.to_string(),
            status: Some(status),
            reason: "unexpected status".to_string(),
            transient: Self::RETRY_STATUSES.contains(&status),
        }
    }

    /// Whether another attempt might succeed: a 5xx from
    /// [`Self::RETRY_STATUSES`] or a network-level failure such as a timeout.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::Fetch { transient: true, .. })
    }
}
