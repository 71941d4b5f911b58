//! HTTP route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready      - Liveness / readiness
//! GET  /login, POST /login         - Sign in (admins only)
//! POST /logout                     - Sign out
//!
//! # Requires admin
//! GET  /                           - Dashboard counts
//! GET  /users                      - User list + create form
//! POST /users                      - Create user
//! GET  /users/{id}/edit            - Edit form
//! POST /users/{id}                 - Update user
//! POST /users/{id}/delete          - Delete user
//! GET  /categories                 - Category list + create form
//! POST /categories                 - Create category
//! GET  /categories/{id}/edit       - Edit form
//! POST /categories/{id}            - Update category
//! POST /categories/{id}/delete     - Delete category
//! GET  /products                   - Product list
//! GET  /products/new               - Create form
//! POST /products                   - Create (multipart, uploads images first)
//! POST /products/{id}/delete       - Delete product
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::api::ApiError;
use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{clear_session, login_rate_limiter};
use crate::models::{Flash, set_flash};
use crate::state::AppState;

/// Create the user management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/{id}", post(users::update))
        .route("/{id}/edit", get(users::edit))
        .route("/{id}/delete", post(users::delete))
}

/// Create the category management routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{id}", post(categories::update))
        .route("/{id}/edit", get(categories::edit))
        .route("/{id}/delete", post(categories::delete))
}

/// Create the product management routes router. The create form carries
/// image files, so its body limit comes from configuration.
pub fn product_routes(upload_limit_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::index)
                .post(products::create)
                .layer(DefaultBodyLimit::max(upload_limit_bytes)),
        )
        .route("/new", get(products::new))
        .route("/{id}/delete", post(products::delete))
}

/// Create the auth routes router. Login submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .layer(login_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create all routes for the admin console.
pub fn routes(upload_limit_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes(upload_limit_bytes))
        .merge(auth_routes())
}

/// Liveness health check endpoint.
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
    AppError::NotFound("page".to_string())
}

/// Report a failed management call and pick where to go next.
///
/// A rejected token ends the session and sends the admin to the login page;
/// any other failure is flashed and the admin returns to `back`.
pub(crate) async fn after_failure(
    session: &Session,
    error: &ApiError,
    fallback: &str,
    back: &str,
) -> Redirect {
    if matches!(error, ApiError::Unauthorized(_)) {
        if let Err(e) = clear_session(session).await {
            tracing::error!("Failed to clear session: {e}");
        }
        clear_sentry_user();
        set_flash(session, Flash::error(error.user_message(fallback))).await;
        return Redirect::to("/login");
    }

    set_flash(session, Flash::error(error.user_message(fallback))).await;
    Redirect::to(back)
}
