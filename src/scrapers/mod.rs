//! Retailer page scrapers.
//!
//! A run follows a two-phase pattern:
//!
//! 1. **Listing**: [`listing::load_catalog`] reads the products and capsule
//!    ranges embedded in the category listing page
//! 2. **Detail**: [`detail::enrich_range`] visits each single-capsule product
//!    page of a range for caffeine and image data
//!
//! [`collect_ranges`] drives both phases into the output document. Requests
//! are issued one at a time.

pub mod detail;
pub mod listing;

use crate::fetch::Fetch;
use crate::models::SimpleData;
use listing::Catalog;
use tracing::{info, instrument, warn};

/// Enrich every eligible range of `catalog`, keyed by range display name.
#[instrument(level = "info", skip_all, fields(ranges = catalog.ranges.len()))]
pub async fn collect_ranges<F: Fetch>(fetcher: &F, domain: &str, catalog: &Catalog) -> SimpleData {
    let mut simple_data = SimpleData::new();
    for range in &catalog.ranges {
        let range_name = range.display_name();
        info!(range = %range_name, "Current range");
        let items = detail::enrich_range(fetcher, domain, range, &catalog.products).await;
        info!(range = %range_name, count = items.len(), "Collected range");
        if simple_data.insert(range_name.to_string(), items).is_some() {
            warn!(range = %range_name, "Duplicate range name; keeping the later one");
        }
    }
    simple_data
}


#[cfg(test)]
mod tests {
    use super::testing::{StubFetcher, detail_page};
    use super::*;
    use crate::models::{Category, Product, SuperCategories};
    use serde_json::json;

    fn range(id: &str, name: Option<&str>) -> Category {
        Category {
            id: Some(id.into()),
            name: name.map(Into::into),
            super_categories: Some(SuperCategories::Path(listing::CAPSULE_RANGE_MARKER.into())),
        }
    }

    fn capsule(range_id: &str, url: &str) -> Product {
        Product {
            ranges: vec![range_id.into()],
            kind: Some("capsule".into()),
            unit_quantity: Some(1.0),
            url: Some(url.into()),
            ..Product::default()
        }
    }

    #[tokio::test]
    async fn test_collect_ranges_groups_by_range_name() {
        let detail = |name: &str| {
            detail_page(&json!({
                "configuration": { "eCommerceData": { "product": { "name": name } } }
            }))
        };
        let fetcher = StubFetcher::default()
            .page("https://x/a", &detail("A"))
            .page("https://x/b", &detail("B"));

        let catalog = Catalog {
            products: vec![capsule("r1", "/a"), capsule("r2", "/b")],
            categories: vec![],
            ranges: vec![range("r1", Some("Range 1")), range("r2", None), range("r3", Some("Empty"))],
        };

        let data = collect_ranges(&fetcher, "https://x", &catalog).await;
        assert_eq!(data.len(), 3);
        assert!(data["Range 1"].contains_key("A"));
        assert!(data["Unknown Range"].contains_key("B"));
        assert!(data["Empty"].is_empty());
    }
}
