//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Audio
//!     description: Headphones and speakers
//! products:
//!   - name: Arc Buds
//!     price: 129.00
//!     stock: 40
//!     category: Audio
//!     specifications:
//!       Battery: 30h
//!     main_image: https://cdn.arcverse.store/buds.jpg
//!     colors:
//!       - color: Black
//!         images: [https://cdn.arcverse.store/buds-black.jpg]
//! ```
//!
//! Categories are matched by name, ignoring case, and only missing ones are
//! created. Products whose name already exists are skipped, so a catalog
//! can be applied more than once.

use std::collections::{BTreeMap, HashMap, HashSet};

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, warn};

use arcverse_core::catalog::Category;
use arcverse_core::payloads::{CategoryPayload, ColourVariant, ProductPayload};
use arcverse_core::{CategoryId, Price, PriceError};

use super::{CliError, api_client, sign_in};

/// A catalog file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One category entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One product entry. Image fields are URLs that are already hosted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: PriceInput,
    #[serde(default)]
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColourVariant>,
}

/// A price as written in YAML: a bare number or a quoted string. Both are
/// read with the same strict rules as the admin product form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Whole(i64),
    Fraction(f64),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<Price, PriceError> {
        match self {
            Self::Whole(n) => Price::parse_strict(&n.to_string()),
            Self::Fraction(f) => Price::parse_strict(&f.to_string()),
            Self::Text(text) => Price::parse_strict(text),
        }
    }
}

/// Totals printed when seeding finishes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_created: usize,
    pub products_created: usize,
    pub products_skipped: usize,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl CatalogFile {
    /// Check the catalog before touching the backend.
    ///
    /// Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                errors.push(format!("categories[{i}]: name is required"));
            }
        }
        let mut seen = HashSet::new();
        for (i, product) in self.products.iter().enumerate() {
            let label = format!("products[{i}] ({})", product.name.trim());
            if product.name.trim().is_empty() {
                errors.push(format!("products[{i}]: name is required"));
            } else if !seen.insert(key(&product.name)) {
                errors.push(format!("{label}: product is listed more than once"));
            }
            if let Err(e) = product.price.parse() {
                errors.push(format!("{label}: {e}"));
            }
            if product.stock < 0 {
                errors.push(format!("{label}: stock cannot be negative"));
            }
            if product.category.trim().is_empty() {
                errors.push(format!("{label}: category is required"));
            }
        }
        errors
    }

    /// Every category name the file mentions, declared or referenced by a
    /// product, deduplicated case-insensitively in first-seen order.
    fn referenced_categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for category in self.categories.iter().map(|c| c.name.as_str()).chain(
            self.products.iter().map(|p| p.category.as_str()),
        ) {
            if !names.iter().any(|n| key(n) == key(category)) {
                names.push(category);
            }
        }
        names
    }
}

impl ProductSeed {
    fn payload(&self, category_id: CategoryId) -> Result<ProductPayload, CliError> {
        let price = self
            .price
            .parse()
            .map_err(|e| CliError::Invalid(format!("{}: {e}", self.name.trim())))?;
        Ok(ProductPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            stock: self.stock,
            category_id,
            specifications: self
                .specifications
                .iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .collect(),
            main_image: self.main_image.clone().filter(|url| !url.trim().is_empty()),
            color_variants: self
                .colors
                .iter()
                .filter(|v| !v.color.trim().is_empty())
                .map(|v| ColourVariant::new(&v.color, v.images.clone()))
                .collect(),
        })
    }
}

fn category_ids(categories: &[Category]) -> HashMap<String, CategoryId> {
    categories.iter().map(|c| (key(&c.name), c.id)).collect()
}

/// Seed the catalog described in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, the
/// operator cannot sign in, or a backend call fails.
pub async fn catalog(file_path: &str) -> Result<SeedSummary, CliError> {
    info!(path = %file_path, "Loading catalog");

    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        for err in &errors {
            warn!("  - {err}");
        }
        return Err(CliError::Invalid(format!(
            "{} problem(s) in {file_path}",
            errors.len()
        )));
    }
    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Catalog validated"
    );

    let api = api_client()?;
    let token = sign_in(&api).await?;
    let token = token.expose_secret();
    let mut summary = SeedSummary::default();

    let mut ids = category_ids(&api.list_categories(token).await?);
    for name in catalog.referenced_categories() {
        if ids.contains_key(&key(name)) {
            continue;
        }
        let description = catalog
            .categories
            .iter()
            .find(|c| key(&c.name) == key(name))
            .map(|c| c.description.trim().to_string())
            .unwrap_or_default();
        api.create_category(
            token,
            &CategoryPayload {
                name: name.trim().to_string(),
                description,
            },
        )
        .await?;
        info!("Created category {}", name.trim());
        summary.categories_created += 1;
    }
    if summary.categories_created > 0 {
        ids = category_ids(&api.list_categories(token).await?);
    }

    let existing: Vec<String> = api
        .list_products(token)
        .await?
        .iter()
        .map(|p| key(&p.name))
        .collect();

    for product in &catalog.products {
        if existing.contains(&key(&product.name)) {
            info!("Skipping existing product {}", product.name.trim());
            summary.products_skipped += 1;
            continue;
        }
        let category_id = ids.get(&key(&product.category)).copied().ok_or_else(|| {
            CliError::Invalid(format!(
                "category {} was not found after creating it",
                product.category
            ))
        })?;
        api.create_product(token, &product.payload(category_id)?)
            .await?;
        info!("Created product {}", product.name.trim());
        summary.products_created += 1;
    }

    info!("Seeding complete!");
    info!("  Categories created: {}", summary.categories_created);
    info!("  Products created: {}", summary.products_created);
    info!("  Products skipped (already exist): {}", summary.products_skipped);

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r"
categories:
  - name: Audio
    description: Headphones and speakers
products:
  - name: Arc Buds
    price: 129.5
    stock: 40
    category: audio
    specifications:
      Battery: 30h
      Blank: ''
    colors:
      - color: Black
        images: [a.jpg, b.jpg, c.jpg, d.jpg]
      - color: ''
        images: [e.jpg]
  - name: Arc Sleeve
    price: '39'
    category: Carry
";

    #[test]
    fn test_parse_catalog() {
        let catalog: CatalogFile = serde_yaml::from_str(CATALOG).unwrap();
        assert!(catalog.validate().is_empty());
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.products[1].stock, 0);
        assert_eq!(catalog.referenced_categories(), vec!["Audio", "Carry"]);
    }

    #[test]
    fn test_product_payload_cleans_fields() {
        let catalog: CatalogFile = serde_yaml::from_str(CATALOG).unwrap();
        let payload = catalog.products[0].payload(CategoryId::new(2)).unwrap();
        assert_eq!(payload.category_id, CategoryId::new(2));
        assert_eq!(payload.specifications.len(), 1);
        assert_eq!(payload.color_variants.len(), 1);
        assert_eq!(payload.color_variants[0].images.len(), 3);
        assert!(payload.main_image.is_none());
        assert_eq!(payload.price.display(), "$129.50");
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
categories:
  - name: ' '
products:
  - name: Broken
    price: 5
    stock: -2
    category: ''
",
        )
        .unwrap();
        let errors = catalog.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[1].contains("stock"));
    }

    #[test]
    fn test_quoted_prices_parsed_strictly() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
products:
  - name: Quote Only
    price: call us
    category: Audio
  - name: Refund
    price: '-5'
    category: Audio
  - name: Sleeve
    price: '$39.00'
    category: Carry
",
        )
        .unwrap();
        let errors = catalog.validate();
        assert_eq!(
            errors,
            vec![
                "products[0] (Quote Only): price must be a number".to_string(),
                "products[1] (Refund): price cannot be negative".to_string(),
            ]
        );
        let payload = catalog.products[2].payload(CategoryId::new(1)).unwrap();
        assert_eq!(payload.price, Price::from_cents(3900));
    }

    #[test]
    fn test_duplicate_product_names_reported() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
products:
  - name: Arc Buds
    price: 129
    category: Audio
  - name: ' arc buds '
    price: 129
    category: Audio
",
        )
        .unwrap();
        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("products[1]"));
        assert!(errors[0].contains("listed more than once"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<CatalogFile, _> =
            serde_yaml::from_str("products:\n  - name: X\n    price: 1\n    category: A\n    colour: red\n");
        assert!(result.is_err());
    }
}
