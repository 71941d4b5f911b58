//! Catalog payloads: products, images and categories.
//!
//! Field names follow the backend's JSON exactly (it mixes `camelCase`,
//! `snake_case` and a capitalised `CategoryId`), so most fields carry an
//! explicit `serde(rename)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CategoryId, ImageId, Price, ProductId};

/// Number of products shown in the home page best-seller rail.
pub const BEST_SELLER_COUNT: usize = 6;

/// Number of products shown under "You May Also Like".
pub const RELATED_PRODUCT_COUNT: usize = 5;

/// A product image, optionally tied to a colour variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    /// Sent as `0`/`1` by the backend.
    #[serde(rename = "isDefault", default, deserialize_with = "deserialize_flag")]
    pub is_default: bool,
    #[serde(default)]
    pub colour_variants: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "CategoryId", default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "deserialize_specifications")]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_description: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Only present on `GET /products/{id}?userId=`; `1` when wishlisted.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_favourite: bool,
}

impl Product {
    /// The image flagged as default, falling back to the first image.
    #[must_use]
    pub fn default_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_default)
            .or_else(|| self.images.first())
    }

    /// Distinct colour variant names in the order their images appear.
    #[must_use]
    pub fn colour_variants(&self) -> Vec<&str> {
        let mut colours: Vec<&str> = Vec::new();
        for colour in self
            .images
            .iter()
            .filter_map(|img| img.colour_variants.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            if !colours.contains(&colour) {
                colours.push(colour);
            }
        }
        colours
    }

    /// Images belonging to one colour variant.
    #[must_use]
    pub fn images_for_colour(&self, colour: &str) -> Vec<&ProductImage> {
        self.images
            .iter()
            .filter(|img| img.colour_variants.as_deref().map(str::trim) == Some(colour))
            .collect()
    }

    /// Whether the backend reports any stock left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Display name of the product's category.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Product")
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub description: String,
}

/// Up to `limit` products other than `current`, in catalog order.
#[must_use]
pub fn related_products(all: &[Product], current: ProductId, limit: usize) -> Vec<Product> {
    all.iter()
        .filter(|p| p.id != current)
        .take(limit)
        .cloned()
        .collect()
}

/// The leading products of the catalog, used as the best-seller rail.
#[must_use]
pub fn best_sellers(all: &[Product], limit: usize) -> Vec<Product> {
    all.iter().take(limit).cloned().collect()
}

/// Look up a category name by id.
#[must_use]
pub fn category_name(categories: &[Category], id: Option<CategoryId>) -> Option<&str> {
    let id = id?;
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}

// =============================================================================
// Lenient field decoding
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accept `true`/`false`, `0`/`1`, `"0"`/`"1"` or `null`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        None => false,
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Int(i)) => i != 0,
        Some(RawFlag::Text(s)) => matches!(s.trim(), "1" | "true"),
    })
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Specifications arrive as an object, as a JSON-encoded object string, or
/// as `null`. Non-string values are rendered with their JSON text.
fn deserialize_specifications<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let object = match value {
        Some(serde_json::Value::Object(map)) => map,
        Some(serde_json::Value::String(text)) => {
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(serde_json::Value::Object(map)) => map,
                _ => return Ok(BTreeMap::new()),
            }
        }
        _ => return Ok(BTreeMap::new()),
    };

    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}
