//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::cart::PLACEHOLDER_IMAGE;
use arcverse_core::catalog::{Category, Product, RELATED_PRODUCT_COUNT, related_products};
use arcverse_core::{CategoryId, ProductId};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::PageContext;
use crate::state::AppState;

/// Product tile data for grids.
#[derive(Clone, Debug)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub category: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price.display(),
            image_url: product
                .default_image()
                .map_or_else(|| PLACEHOLDER_IMAGE.to_string(), |img| img.url.clone()),
            category: product.category_label().to_string(),
            in_stock: product.in_stock(),
        }
    }
}

/// Build grid tiles, naming categories from the category list when the
/// product payload does not carry `category_name`.
#[must_use]
pub fn product_cards(products: &[Product], categories: &[Category]) -> Vec<ProductCard> {
    products
        .iter()
        .map(|product| {
            let mut card = ProductCard::from(product);
            if product.category_name.is_none()
                && let Some(name) =
                    arcverse_core::catalog::category_name(categories, product.category_id)
            {
                card.category = name.to_string();
            }
            card
        })
        .collect()
}

/// Product listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Category filter chip on the listing page.
#[derive(Clone, Debug)]
pub struct CategoryFilter {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub heading: String,
    pub products: Vec<ProductCard>,
    pub category_filters: Vec<CategoryFilter>,
    pub filtered: bool,
}

/// Display product listing, optionally limited to one category.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let categories = state.api().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories: {e}");
        Vec::new()
    });

    let products = match state.api().list_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            page.fail_soft("Failed to load products");
            Vec::new()
        }
    };

    let selected_category = query
        .category
        .as_deref()
        .and_then(|raw| raw.parse::<CategoryId>().ok());

    let visible: Vec<Product> = match selected_category {
        Some(id) => products
            .into_iter()
            .filter(|p| p.category_id == Some(id))
            .collect(),
        None => products,
    };

    let heading = selected_category
        .and_then(|id| arcverse_core::catalog::category_name(&categories, Some(id)))
        .unwrap_or("All Products")
        .to_string();

    let category_filters = categories
        .iter()
        .map(|c| CategoryFilter {
            id: c.id,
            name: c.name.clone(),
            selected: selected_category == Some(c.id),
        })
        .collect();

    ProductsIndexTemplate {
        page,
        heading,
        products: product_cards(&visible, &categories),
        category_filters,
        filtered: selected_category.is_some(),
    }
}

/// Image data for the detail gallery.
#[derive(Clone, Debug)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
}

/// Colour swatch linking to that variant's gallery.
#[derive(Clone, Debug)]
pub struct ColourOption {
    pub name: String,
    pub href: String,
    pub selected: bool,
}

/// Product detail query parameters.
#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub colour: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
    pub category: String,
    pub main_image: String,
    pub gallery: Vec<GalleryImage>,
    pub colours: Vec<ColourOption>,
    pub selected_colour: Option<String>,
    pub specifications: Vec<(String, String)>,
    pub wishlisted: bool,
    pub related: Vec<ProductCard>,
    pub return_to: String,
}

/// Display product detail.
///
/// With a `colour` query the gallery shows that variant's images; without
/// one it shows every image, default first.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(query): Query<ShowQuery>,
) -> Result<impl IntoResponse> {
    let product = state
        .api()
        .get_product(id, user.as_ref().map(|u| u.id))
        .await?;

    let page = PageContext::load(&session).await;

    let related = match state.api().list_products().await {
        Ok(all) => related_products(&all, product.id, RELATED_PRODUCT_COUNT),
        Err(e) => {
            tracing::warn!("Failed to fetch related products: {e}");
            Vec::new()
        }
    };

    let colours: Vec<String> = product
        .colour_variants()
        .into_iter()
        .map(String::from)
        .collect();
    let selected_colour = query
        .colour
        .map(|c| c.trim().to_string())
        .filter(|c| colours.contains(c));

    let images = match selected_colour.as_deref() {
        Some(colour) => product.images_for_colour(colour),
        None => {
            let mut all: Vec<_> = product.images.iter().collect();
            all.sort_by_key(|img| !img.is_default);
            all
        }
    };

    let gallery: Vec<GalleryImage> = images
        .iter()
        .enumerate()
        .map(|(i, img)| GalleryImage {
            url: img.url.clone(),
            alt: format!("{} image {}", product.name, i + 1),
        })
        .collect();

    let main_image = gallery
        .first()
        .map_or_else(|| PLACEHOLDER_IMAGE.to_string(), |img| img.url.clone());

    let colours = colours
        .into_iter()
        .map(|name| ColourOption {
            href: format!(
                "/products/{}?colour={}",
                product.id,
                urlencoding::encode(&name)
            ),
            selected: selected_colour.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    let specifications = product
        .specifications
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(ProductShowTemplate {
        page,
        category: product.category_label().to_string(),
        main_image,
        gallery,
        colours,
        selected_colour,
        specifications,
        wishlisted: product.is_favourite,
        related: related.iter().map(ProductCard::from).collect(),
        return_to: format!("/products/{}", product.id),
        product,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_uses_placeholder_without_images() {
        let product: Product =
            serde_json::from_value(json!({"id": 1, "name": "Bare", "price": "5"})).unwrap();
        let card = ProductCard::from(&product);
        assert_eq!(card.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(card.price, "$5.00");
        assert!(!card.in_stock);
    }

    #[test]
    fn test_cards_fill_category_from_list() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": 1, "name": "Lamp", "CategoryId": 2},
            {"id": 2, "name": "Buds", "CategoryId": 1, "category_name": "Audio Gear"}
        ]))
        .unwrap();
        let categories: Vec<Category> = serde_json::from_value(json!([
            {"id": 1, "name": "Audio"},
            {"id": 2, "name": "Lighting"}
        ]))
        .unwrap();

        let cards = product_cards(&products, &categories);
        assert_eq!(cards[0].category, "Lighting");
        assert_eq!(cards[1].category, "Audio Gear");
    }
}
