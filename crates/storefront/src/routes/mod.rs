//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Home page (hero + best sellers)
//! GET  /health                     - Liveness
//! GET  /health/ready               - Readiness (pings the backend)
//!
//! # Catalog
//! GET  /products                   - Product grid (?category= filter)
//! GET  /products/{id}              - Product detail (?colour= variant)
//! GET  /products/preferences       - Category preference picker
//! POST /products/preferences       - Apply preferences
//! GET  /products/curated           - Products in the chosen categories
//! GET  /collections                - Category listing
//! GET  /collections/{id}           - Products of one category
//!
//! # Cart (requires login for changes)
//! GET  /cart                       - Cart page with totals
//! POST /cart/add                   - Add product
//! POST /cart/update                - Set line quantity
//! POST /cart/remove                - Remove product line
//! POST /cart/clear                 - Remove every line
//! GET  /cart/count                 - Cart badge fragment
//! POST /cart/checkout              - Place order straight from the cart
//!
//! # Checkout
//! GET  /checkout                   - Step 1: billing form
//! POST /checkout/billing           - Validate and store billing details
//! GET  /checkout/payment           - Step 2: payment form
//! POST /checkout/payment           - Validate card shape and place order
//! GET  /checkout/success           - Order confirmation
//!
//! # Account
//! GET  /orders                     - Order history
//! GET  /wishlist                   - Wishlist
//! POST /wishlist/toggle            - Add/remove a product
//! GET  /login, POST /login         - Sign in
//! GET  /signup, POST /signup       - Register
//! POST /logout                     - Sign out
//!
//! # Content
//! GET  /support, /stories          - Static pages
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod home;
pub mod orders;
pub mod pages;
pub mod preferences;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route(
            "/preferences",
            get(preferences::show).post(preferences::apply),
        )
        .route("/curated", get(preferences::curated))
        .route("/{id}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{id}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/checkout", post(checkout::place_from_cart))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::billing_page))
        .route("/billing", post(checkout::submit_billing))
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::submit_payment),
        )
        .route("/success", get(checkout::success))
}

/// Create the auth routes router. Form submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/signup", get(auth::signup_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders", get(orders::index))
        .route("/wishlist", get(wishlist::index))
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/support", get(pages::support))
        .route("/stories", get(pages::stories))
        .merge(auth_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend API is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("that page".to_string())
}

/// A same-site path to return to after a form post, or `default`.
///
/// Only absolute paths are accepted; `//host` and full URLs fall back so the
/// field cannot be used as an open redirect.
#[must_use]
pub fn safe_return_path(candidate: Option<&str>, default: &str) -> String {
    match candidate.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/products/3"), "/"), "/products/3");
        assert_eq!(safe_return_path(Some("//evil.test"), "/cart"), "/cart");
        assert_eq!(safe_return_path(Some("https://evil.test"), "/cart"), "/cart");
        assert_eq!(safe_return_path(Some("/\\evil.test"), "/cart"), "/cart");
        assert_eq!(safe_return_path(None, "/cart"), "/cart");
    }
}
