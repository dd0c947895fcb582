//! Product detail pages: caffeine content and image URL per capsule.

use crate::errors::ScrapeError;
use crate::extract::{DETAIL_SELECTOR, extract_json};
use crate::fetch::Fetch;
use crate::models::{Category, EnrichedItem, Product, RangeItems};
use crate::utils::absolute_url;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Item key when the detail page has no product name.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown";

static CAFFEINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s?mg").expect("valid regex"));

/// Enrich every single-capsule SKU of `range`.
///
/// A product whose detail page cannot be fetched or parsed is logged as a
/// warning and left out; the rest of the range is still processed.
///
/// # Arguments
///
/// * `fetcher` - Source of detail pages
/// * `domain` - Scheme and host that product and image paths are joined to
/// * `range` - The capsule range to enrich
/// * `products` - The full catalog; only single-capsule SKUs of `range` are visited
///
/// # Returns
///
/// The range's items keyed by detail-page product name. Empty when the range
/// has no id or no eligible products.
#[instrument(level = "info", skip_all, fields(range = %range.display_name()))]
pub async fn enrich_range<F: Fetch>(
    fetcher: &F,
    domain: &str,
    range: &Category,
    products: &[Product],
) -> RangeItems {
    let mut items = RangeItems::new();
    let Some(range_id) = range.id.as_deref() else {
        warn!("Range has no id; no products can belong to it");
        return items;
    };

    for product in products.iter().filter(|p| p.is_single_capsule_in(range_id)) {
        info!(capsule = product.name.as_deref().unwrap_or(UNKNOWN_ITEM_NAME), "Current capsule");
        let url = absolute_url(domain, product.url.as_deref().unwrap_or_default());

        let (name, item) = match enrich_product(fetcher, domain, &url).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%url, error = %e, "Failed to fetch item page; skipping");
                continue;
            }
        };

        if items.insert(name.clone(), item).is_some() {
            warn!(name = %name, "Duplicate capsule name in range; keeping the later one");
        }
    }

    debug!(count = items.len(), "Enriched range");
    items
}

async fn enrich_product<F: Fetch>(
    fetcher: &F,
    domain: &str,
    url: &str,
) -> Result<(String, EnrichedItem), ScrapeError> {
    let detail = extract_json(fetcher, url, DETAIL_SELECTOR).await?;
    Ok(item_from_detail(&detail, domain))
}

/// Build the keyed output entry from a detail page's embedded JSON.
///
/// Missing levels under `configuration.eCommerceData.product` give defaults:
/// no caffeine, a domain-only image URL and the name `"Unknown"`.
pub fn item_from_detail(detail: &Value, domain: &str) -> (String, EnrichedItem) {
    let product = detail
        .get("configuration")
        .and_then(|c| c.get("eCommerceData"))
        .and_then(|e| e.get("product"));
    let field = |key: &str| product.and_then(|p| p.get(key));

    let fragments: Vec<String> = field("ingredients")
        .and_then(Value::as_array)
        .map(|ingredients| ingredients.iter().map(ingredient_text).collect())
        .unwrap_or_default();

    let image_path = field("image")
        .and_then(|i| i.get("url"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let name = field("name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ITEM_NAME)
        .to_string();

    let item = EnrichedItem {
        caffeine_mg: caffeine_mg(&fragments),
        image_url: absolute_url(domain, image_path),
    };
    (name, item)
}

/// Text of one ingredient entry; non-string values keep their JSON form.
fn ingredient_text(ingredient: &Value) -> String {
    match ingredient.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Milligrams from the first `<digits>mg` in the joined ingredient text.
///
/// Returns `None` when nothing matches or the figure does not fit a `u32`.
pub fn caffeine_mg<S: AsRef<str>>(fragments: &[S]) -> Option<u32> {
    let text = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<&str>>()
        .join(" | ");
    CAFFEINE_RE
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
