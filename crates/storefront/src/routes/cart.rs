//! Cart route handlers.
//!
//! The backend keeps cart rows per user, so the cart page is rebuilt from
//! `GET /cart/{userId}` on every visit. Changes are plain form posts that
//! redirect back; the badge count is cached in the session.

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

use arcverse_core::cart::{CartLine, CartTotals};
use arcverse_core::{CartLineId, ProductId, UserId};

use super::safe_return_path;
use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Flash, PageContext, cart_count, set_cart_count, set_flash};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub unit_price: String,
    pub line_total: String,
    pub quantity: u32,
}

impl CartLineView {
    /// Decrement is not offered below one.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }

    #[must_use]
    pub const fn decremented(&self) -> u32 {
        self.quantity.saturating_sub(1)
    }

    #[must_use]
    pub const fn incremented(&self) -> u32 {
        self.quantity.saturating_add(1)
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            line_id: line.id,
            product_id: line.product_id,
            name: line.name.clone(),
            category: line.category_label().to_string(),
            image_url: line.image().to_string(),
            unit_price: line.price.display(),
            line_total: line.line_total().display(),
            quantity: line.effective_quantity(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone, Debug, Default)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_lines(&[])
    }

    /// Build the view and its totals from backend rows.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let totals = CartTotals::compute(lines);
        Self {
            lines: lines.iter().map(CartLineView::from).collect(),
            subtotal: totals.subtotal.display(),
            tax: totals.tax.display(),
            total: totals.total.display(),
            item_count: totals.item_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Fetch a user's cart and refresh the session badge count.
pub(crate) async fn load_cart(
    state: &AppState,
    session: &Session,
    user_id: UserId,
) -> Result<Vec<CartLine>, ApiError> {
    let lines = state.api().get_cart(user_id).await?;
    set_cart_count(session, CartTotals::compute(&lines).item_count).await;
    Ok(lines)
}

/// Refresh the badge count after a change, ignoring fetch failures.
async fn refresh_count(state: &AppState, session: &Session, user_id: UserId) {
    if let Err(e) = load_cart(state, session, user_id).await {
        tracing::warn!("Failed to refresh cart count: {e}");
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: CartLineId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = match &user {
        Some(user) => match load_cart(&state, &session, user.id).await {
            Ok(lines) => Ok(CartView::from_lines(&lines)),
            Err(e) => {
                tracing::error!("Failed to fetch cart: {e}");
                Err(())
            }
        },
        None => Ok(CartView::empty()),
    };

    let mut page = PageContext::load(&session).await;
    let cart = cart.unwrap_or_else(|()| {
        page.fail_soft("Failed to load cart");
        CartView::empty()
    });

    CartShowTemplate { page, cart }
}

/// Add item to cart.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let quantity = form.quantity.unwrap_or(1).max(1);
    let back = safe_return_path(form.return_to.as_deref(), "/cart");

    match state
        .api()
        .add_to_cart(user.id, form.product_id, quantity)
        .await
    {
        Ok(()) => {
            let product_id = form.product_id.to_string();
            add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
            refresh_count(&state, &session, user.id).await;
            set_flash(&session, Flash::success("Item added to cart")).await;
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            set_flash(
                &session,
                Flash::error(e.user_message("Failed to add item to cart")),
            )
            .await;
        }
    }

    Redirect::to(&back)
}

/// Update cart item quantity. Quantities below one are raised to one.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    let quantity = form.quantity.max(1);

    if let Err(e) = state
        .api()
        .update_cart_item(user.id, form.line_id, quantity)
        .await
    {
        tracing::error!("Failed to update cart: {e}");
        set_flash(
            &session,
            Flash::error(e.user_message("Failed to update quantity")),
        )
        .await;
    }

    refresh_count(&state, &session, user.id).await;
    Redirect::to("/cart")
}

/// Remove item from cart.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    match state.api().remove_from_cart(user.id, form.product_id).await {
        Ok(()) => set_flash(&session, Flash::success("Item removed from cart")).await,
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            set_flash(&session, Flash::error(e.user_message("Failed to remove item"))).await;
        }
    }

    refresh_count(&state, &session, user.id).await;
    Redirect::to("/cart")
}

/// Remove every line from the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Redirect {
    let outcome = match state.api().get_cart(user.id).await {
        Ok(lines) => {
            let mut result = Ok(());
            for line in &lines {
                if let Err(e) = state.api().remove_from_cart(user.id, line.product_id).await {
                    result = Err(e);
                    break;
                }
            }
            result
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => set_flash(&session, Flash::success("Your cart has been cleared")).await,
        Err(e) => {
            tracing::error!("Failed to clear cart: {e}");
            set_flash(&session, Flash::error("Failed to clear cart")).await;
        }
    }

    refresh_count(&state, &session, user.id).await;
    Redirect::to("/cart")
}

/// Get cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: cart_count(&session).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines() -> Vec<CartLine> {
        serde_json::from_value(json!([
            {"id": 1, "productId": 10, "name": "Arc Buds", "price": "$1,299.00", "quantity": 1},
            {"id": 2, "productId": 11, "name": "Arc Strap", "price": 20.5, "quantity": 3}
        ]))
        .unwrap()
    }

    #[test]
    fn test_cart_view_totals() {
        let view = CartView::from_lines(&lines());
        assert_eq!(view.subtotal, "$1360.50");
        assert_eq!(view.tax, "$136.05");
        assert_eq!(view.total, "$1496.55");
        assert_eq!(view.item_count, 4);
        assert_eq!(view.lines[1].line_total, "$61.50");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.total, "$0.00");
    }

    #[test]
    fn test_decrement_not_offered_below_one() {
        let view = CartView::from_lines(&lines());
        assert!(!view.lines[0].can_decrement());
        assert!(view.lines[1].can_decrement());
        assert_eq!(view.lines[1].decremented(), 2);
        assert_eq!(view.lines[0].incremented(), 2);
    }
}
