//! Page fetching with exponential backoff on transient failures.
//!
//! # Architecture
//!
//! - [`Fetch`]: core trait, one URL in, raw body bytes out
//! - [`HttpFetcher`]: a single `GET` through a shared `reqwest::Client`
//! - [`RetryFetch`]: decorator that retries any [`Fetch`] on transient errors
//!
//! # Retry Strategy
//!
//! - Retries on HTTP 500, 502, 503, 504, timeouts and connection failures
//! - Maximum 5 retries after the first attempt
//! - Exponential backoff starting at 1 second, capped at 120 seconds
//! - Random jitter (0-250ms) added to each delay
//!
//! Any other non-200 status fails on the first attempt, as does a request
//! that cannot be built or a redirect that cannot be followed.

use crate::errors::ScrapeError;
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Desktop browser identity sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Trait for fetching a page body.
///
/// Implementors return the raw bytes of a `200 OK` response, or a
/// [`ScrapeError::Fetch`] describing why they could not.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

/// Build the one HTTP client shared by every request in a run.
///
/// The client carries the browser `User-Agent` and the per-request timeout,
/// and keeps a connection pool for the retailer's host.
///
/// # Arguments
///
/// * `timeout` - Limit for each request, from connect to the end of the body
///
/// # Returns
///
/// A configured `reqwest::Client`, or [`ScrapeError::Client`] if the TLS
/// backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Single-attempt fetcher over a borrowed client.
#[derive(Debug, Clone, Copy)]
pub struct HttpFetcher<'a> {
    pub client: &'a Client,
}

impl<'a> HttpFetcher<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher<'_> {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, &e))?;

        let status = response.status().as_u16();
        if status != 200 {
            debug!(status, elapsed_ms = t0.elapsed().as_millis() as u64, "Non-200 response");
            return Err(ScrapeError::status(url, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ScrapeError::network(url, &e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body.to_vec())
    }
}

/// Backoff parameters for [`RetryFetch`].
///
/// The delay before retry `n` (1-based) is:
/// ```text
/// delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=max_jitter)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(120),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based), without jitter.
    pub fn backoff(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng().random_range(0..=max_ms))
    }
}

/// Wrapper that adds exponential backoff retries to any [`Fetch`].
///
/// Only errors for which [`ScrapeError::is_transient`] holds are retried;
/// everything else is returned on the spot.
pub struct RetryFetch<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Fetch> RetryFetch<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T: Fetch> Fetch for RetryFetch<T> {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let total_t0 = Instant::now();
        let mut retry = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    retry += 1;
                    if retry > self.policy.max_retries {
                        error!(
                            max = self.policy.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.backoff(retry) + self.policy.jitter();
                    warn!(
                        retry,
                        max = self.policy.max_retries,
                        ?delay,
                        error = %e,
                        "transient fetch failure; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
