//! Small helpers for URL building, CLI validation and log formatting.

use url::Url;

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters and suffixed with the number
/// of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Prefix a site-relative path with the retailer's domain.
///
/// This is plain concatenation: an empty path yields the bare domain.
pub fn absolute_url(domain: &str, path: &str) -> String {
    format!("{domain}{path}")
}

/// `clap` value parser for absolute http(s) URLs.
pub fn parse_http_url(s: &str) -> Result<String, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid URL '{s}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(s.to_string()),
        other => Err(format!("unsupported URL scheme '{other}' in '{s}'")),
    }
}

/// Like [`parse_http_url`], with any trailing `/` removed so paths can be
/// appended directly.
pub fn parse_domain(s: &str) -> Result<String, String> {
    parse_http_url(s).map(|d| d.trim_end_matches('/').to_string())
}
