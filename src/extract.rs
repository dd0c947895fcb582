//! Embedded-JSON extraction.
//!
//! The retailer hydrates its client-side rendering from a `<script>` tag that
//! sits right after a `<div>` with a known id prefix. The script's text is
//! `<prefix code>{ ...json object... }<suffix code>`, so the object is taken
//! from the first `{` to the last `}` of the matched element.
//!
//! Everything that depends on that page template lives in this module.

use crate::errors::ScrapeError;
use crate::fetch::Fetch;
use crate::utils::truncate_for_log;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument};

/// Script block holding the catalog on a listing page.
pub const LISTING_SELECTOR: &str = "div[id^=respProductListPLPCapsule] + script";

/// Script block holding a single product on its detail page.
pub const DETAIL_SELECTOR: &str = "div[id^=respProductDetailPDPCapsule] + script";

/// Fetch `url` and return the JSON object embedded in the first element
/// matching `selector`.
///
/// # Errors
///
/// - [`ScrapeError::Fetch`] if the page cannot be retrieved
/// - [`ScrapeError::SelectorNotFound`] if nothing matches `selector`
/// - [`ScrapeError::MalformedJson`] if no JSON object can be sliced out
#[instrument(level = "debug", skip(fetcher))]
pub async fn extract_json<F: Fetch>(
    fetcher: &F,
    url: &str,
    selector: &str,
) -> Result<Value, ScrapeError> {
    let body = fetcher.fetch(url).await?;
    let html = String::from_utf8_lossy(&body);
    parse_embedded_json(&html, selector, url)
}

/// Offline half of [`extract_json`]: locate, slice and parse.
///
/// `url` is only used for error messages.
pub fn parse_embedded_json(html: &str, selector: &str, url: &str) -> Result<Value, ScrapeError> {
    let parsed_selector = Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let element = document
        .select(&parsed_selector)
        .next()
        .ok_or_else(|| ScrapeError::SelectorNotFound {
            selector: selector.to_string(),
            url: url.to_string(),
        })?;

    let outer = element.html();
    let malformed = |reason: String| ScrapeError::MalformedJson {
        url: url.to_string(),
        reason,
    };

    let json_str = brace_slice(&outer).ok_or_else(|| {
        malformed(format!(
            "no JSON object delimiters in element: {}",
            truncate_for_log(&outer, 120)
        ))
    })?;

    let value: Value = serde_json::from_str(json_str).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("embedded JSON is not an object".to_string()));
    }

    debug!(bytes = json_str.len(), "Extracted embedded JSON");
    Ok(value)
}

/// Substring from the first `{` to the last `}`, inclusive.
fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
