//! Listing page: the product catalog and its capsule ranges.
//!
//! The listing page embeds every product and category under
//! `configuration.eCommerceData`. Only the ranges whose parent path carries
//! the capsule-range marker are kept, minus the limited-edition and
//! assortment ranges which only repeat products listed elsewhere.

use crate::errors::ScrapeError;
use crate::extract::{LISTING_SELECTOR, extract_json};
use crate::fetch::Fetch;
use crate::models::{Category, Product};
use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Parent-path marker shared by every capsule range.
pub const CAPSULE_RANGE_MARKER: &str = "nesclub2.tw.b2c/cat/capsule-range";

/// Ranges that match the marker but are excluded from the output.
pub const EXCLUDED_RANGE_IDS: [&str; 2] = [
    "nesclub2.tw.b2c/cat/capsule-range-limited-edition-b2c",
    "nesclub2.tw.b2c/cat/capsule-range-assortment",
];

/// Everything read from the listing page.
#[derive(Debug, Default)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// Eligible capsule ranges, in listing order.
    pub ranges: Vec<Category>,
}

/// Fetch the listing page and build its [`Catalog`].
///
/// # Arguments
///
/// * `fetcher` - Source of the listing page
/// * `listing_url` - Absolute URL of the category listing
///
/// # Errors
///
/// Any extractor error, or [`ScrapeError::EmptyCatalog`] if the page lists
/// no products.
#[instrument(level = "info", skip(fetcher))]
pub async fn load_catalog<F: Fetch>(fetcher: &F, listing_url: &str) -> Result<Catalog, ScrapeError> {
    let listing = extract_json(fetcher, listing_url, LISTING_SELECTOR).await?;
    let catalog = catalog_from_json(&listing, listing_url)?;
    info!(
        products = catalog.products.len(),
        categories = catalog.categories.len(),
        ranges = catalog.ranges.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}

/// Build a [`Catalog`] from already-extracted listing JSON.
pub fn catalog_from_json(listing: &Value, listing_url: &str) -> Result<Catalog, ScrapeError> {
    let ecommerce = listing
        .get("configuration")
        .and_then(|c| c.get("eCommerceData"));

    let products: Vec<Product> = entries(ecommerce.and_then(|e| e.get("products")));
    if products.is_empty() {
        return Err(ScrapeError::EmptyCatalog {
            url: listing_url.to_string(),
        });
    }

    let categories: Vec<Category> = entries(ecommerce.and_then(|e| e.get("categories")));
    let ranges = eligible_ranges(&categories);

    Ok(Catalog {
        products,
        categories,
        ranges,
    })
}

/// Capsule ranges among `categories`, in their original order.
pub fn eligible_ranges(categories: &[Category]) -> Vec<Category> {
    categories
        .iter()
        .filter(|c| is_capsule_range(c))
        .cloned()
        .collect()
}

fn is_capsule_range(category: &Category) -> bool {
    let marked = category
        .super_categories
        .as_ref()
        .is_some_and(|sc| sc.contains(CAPSULE_RANGE_MARKER));
    let excluded = category
        .id
        .as_deref()
        .is_some_and(|id| EXCLUDED_RANGE_IDS.contains(&id));
    marked && !excluded
}

/// Read an optional JSON array: a missing or non-array value is an empty
/// list. Only entries that are not JSON objects are dropped; odd field types
/// inside an object fall back per field (see [`crate::models`]).
fn entries<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!(index, entry = %truncate_for_log(&item.to_string(), 80), "Skipping non-object catalog entry");
                return None;
            }
            match serde_json::from_value(item.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable catalog entry");
                    None
                }
            }
        })
        .collect()
}
