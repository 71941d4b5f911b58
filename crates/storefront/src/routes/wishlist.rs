//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::ProductId;
use arcverse_core::account::WishlistEntry;
use arcverse_core::cart::PLACEHOLDER_IMAGE;
use arcverse_core::catalog::Product;

use super::safe_return_path;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Flash, PageContext, set_flash};
use crate::state::AppState;

/// Wishlist tile display data.
#[derive(Clone, Debug)]
pub struct WishlistItemView {
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

/// Build tiles, filling whatever the wishlist row leaves out from the
/// catalog. Rows for products no longer in the catalog keep what they have.
fn wishlist_items(entries: &[WishlistEntry], catalog: &[Product]) -> Vec<WishlistItemView> {
    entries
        .iter()
        .map(|entry| {
            let product = catalog.iter().find(|p| p.id == entry.product_id);
            WishlistItemView {
                product_id: entry.product_id,
                name: entry
                    .name
                    .clone()
                    .or_else(|| product.map(|p| p.name.clone()))
                    .unwrap_or_else(|| format!("Product #{}", entry.product_id)),
                price: entry
                    .price
                    .or_else(|| product.map(|p| p.price))
                    .unwrap_or_default()
                    .display(),
                image_url: entry
                    .image_url
                    .clone()
                    .or_else(|| {
                        product
                            .and_then(Product::default_image)
                            .map(|img| img.url.clone())
                    })
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            }
        })
        .collect()
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/index.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub items: Vec<WishlistItemView>,
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
    pub return_to: Option<String>,
}

/// Display the shopper's wishlist.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let entries = match state.api().get_wishlist(user.id).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to fetch wishlist: {e}");
            page.fail_soft("Failed to load wishlist");
            Vec::new()
        }
    };

    let catalog = if entries.is_empty() {
        Vec::new()
    } else {
        state.api().list_products().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch products for wishlist: {e}");
            Vec::new()
        })
    };

    WishlistTemplate {
        page,
        items: wishlist_items(&entries, &catalog),
    }
}

/// Add or remove a product from the wishlist.
#[instrument(skip(state, session, user))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Redirect {
    let back = safe_return_path(form.return_to.as_deref(), "/wishlist");

    match state.api().toggle_wishlist(user.id, form.product_id).await {
        Ok(result) => {
            tracing::info!(
                product_id = %form.product_id,
                wishlisted = result.is_wishlisted,
                "Wishlist toggled"
            );
            set_flash(&session, Flash::success(result.flash_message())).await;
        }
        Err(e) => {
            tracing::error!("Failed to toggle wishlist: {e}");
            set_flash(
                &session,
                Flash::error(e.user_message("Failed to update wishlist")),
            )
            .await;
        }
    }

    Redirect::to(&back)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wishlist_items_fill_from_catalog() {
        let entries: Vec<WishlistEntry> = serde_json::from_value(json!([
            {"id": 1, "productId": 5},
            {"id": 2, "productId": 6, "name": "Kept", "price": "12", "imageUrl": "/u/k.png"},
            {"id": 3, "productId": 99}
        ]))
        .unwrap();
        let catalog: Vec<Product> = serde_json::from_value(json!([
            {"id": 5, "name": "Arc Lamp", "price": "45.5",
             "images": [{"id": 1, "url": "/u/lamp.png", "isDefault": 1}]}
        ]))
        .unwrap();

        let items = wishlist_items(&entries, &catalog);
        assert_eq!(items[0].name, "Arc Lamp");
        assert_eq!(items[0].price, "$45.50");
        assert_eq!(items[0].image_url, "/u/lamp.png");
        assert_eq!(items[1].name, "Kept");
        assert_eq!(items[1].image_url, "/u/k.png");
        assert_eq!(items[2].name, "Product #99");
        assert_eq!(items[2].image_url, PLACEHOLDER_IMAGE);
    }
}
