//! Data models for the listing catalog and the simplified output document.
//!
//! - [`Product`] and [`Category`]: raw entries read from the listing page's
//!   embedded `eCommerceData`
//! - [`EnrichedItem`]: what the output keeps for each capsule
//! - [`SimpleData`]: range name → item name → [`EnrichedItem`]
//!
//! Field names on the raw types follow the site's camelCase JSON via
//! `#[serde(rename)]`. Raw fields are read one by one: a field of an
//! unexpected type falls back to its empty value instead of failing the
//! whole entry, and numeric or boolean ids are kept as their JSON text.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Products keyed by display name within one range.
pub type RangeItems = BTreeMap<String, EnrichedItem>;

/// The output document: range display name → items.
pub type SimpleData = BTreeMap<String, RangeItems>;

/// A product from the listing page's catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Identifiers of the ranges the product belongs to.
    #[serde(deserialize_with = "lenient_strings")]
    pub ranges: Vec<String>,
    /// Type tag, `"capsule"` for capsule SKUs.
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Capsules per SKU. The site emits integers, but nothing stops a float.
    #[serde(rename = "unitQuantity", deserialize_with = "lenient_number")]
    pub unit_quantity: Option<f64>,
    /// Path relative to the retailer's domain.
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

impl Product {
    pub const CAPSULE_TYPE: &'static str = "capsule";

    /// Whether this is a single-capsule SKU belonging to `range_id`.
    pub fn is_single_capsule_in(&self, range_id: &str) -> bool {
        self.ranges.iter().any(|r| r == range_id)
            && self.kind.as_deref() == Some(Self::CAPSULE_TYPE)
            && self.unit_quantity == Some(1.0)
    }
}

/// Parent path of a category. The listing usually emits a single path
/// string, occasionally a list of category ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SuperCategories {
    Path(String),
    List(Vec<String>),
}

impl SuperCategories {
    /// Substring test for a path, membership test for a list.
    pub fn contains(&self, marker: &str) -> bool {
        match self {
            SuperCategories::Path(path) => path.contains(marker),
            SuperCategories::List(ids) => ids.iter().any(|id| id == marker),
        }
    }
}

/// A merchandising category from the listing. Capsule ranges are a subset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "superCategories", deserialize_with = "lenient")]
    pub super_categories: Option<SuperCategories>,
}

impl Category {
    pub const UNKNOWN_NAME: &'static str = "Unknown Range";

    /// Display name, falling back to `"Unknown Range"`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::UNKNOWN_NAME)
    }
}

/// Strings as-is, numbers and booleans as their JSON text, anything else
/// (null, arrays, objects) as `None`.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        _ => None,
    })
}

/// The string elements of an array; a non-array is an empty list.
fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

/// One capsule in the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedItem {
    /// Caffeine per capsule in milligrams; `null` when the ingredient text
    /// carries no `<digits>mg` figure.
    pub caffeine_mg: Option<u32>,
    /// Absolute image URL; just the domain when the page has no image.
    pub image_url: String,
}
