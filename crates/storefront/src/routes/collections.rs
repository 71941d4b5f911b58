//! Collection (category) route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::CategoryId;
use arcverse_core::catalog::{Category, Product};

use super::products::{ProductCard, product_cards};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::PageContext;
use crate::state::AppState;

/// Category tile with its product count.
#[derive(Clone, Debug)]
pub struct CollectionView {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub product_count: usize,
}

/// Collections listing template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub page: PageContext,
    pub collections: Vec<CollectionView>,
}

/// Single collection template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub page: PageContext,
    pub collection: Category,
    pub products: Vec<ProductCard>,
}

fn collection_views(categories: &[Category], products: &[Product]) -> Vec<CollectionView> {
    categories
        .iter()
        .map(|category| CollectionView {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            product_count: products
                .iter()
                .filter(|p| p.category_id == Some(category.id))
                .count(),
        })
        .collect()
}

/// Display every category.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let categories = match state.api().list_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            page.fail_soft("Failed to load collections");
            Vec::new()
        }
    };
    let products = state.api().list_products().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch products for collection counts: {e}");
        Vec::new()
    });

    CollectionsIndexTemplate {
        page,
        collections: collection_views(&categories, &products),
    }
}

/// Display the products of one category.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    let categories = state.api().list_categories().await?;
    let collection = categories
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("that collection".to_string()))?;

    let mut page = PageContext::load(&session).await;
    let products: Vec<Product> = match state.api().list_products().await {
        Ok(products) => products
            .into_iter()
            .filter(|p| p.category_id == Some(id))
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            page.fail_soft("Failed to load products");
            Vec::new()
        }
    };

    Ok(CollectionShowTemplate {
        page,
        products: product_cards(&products, &categories),
        collection,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_counts() {
        let categories: Vec<Category> =
            serde_json::from_value(json!([{"id": 1, "name": "Audio"}, {"id": 2, "name": "Bags"}]))
                .unwrap();
        let products: Vec<Product> = serde_json::from_value(json!([
            {"id": 1, "name": "A", "CategoryId": 1},
            {"id": 2, "name": "B", "CategoryId": 1},
            {"id": 3, "name": "C"}
        ]))
        .unwrap();

        let views = collection_views(&categories, &products);
        assert_eq!(views[0].product_count, 2);
        assert_eq!(views[1].product_count, 0);
    }
}
