//! HTTP client for the storefront's backend endpoints.
//!
//! Products and categories are cached for 5 minutes; everything tied to a
//! user (product detail with wishlist state, cart, orders, wishlist) is
//! always fetched fresh.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use arcverse_core::account::{AuthResponse, WishlistEntry, WishlistToggle};
use arcverse_core::cart::{CartLine, OrderLine};
use arcverse_core::catalog::{Category, Product};
use arcverse_core::wire::{ListResponse, error_message};
use arcverse_core::{CartLineId, CategoryId, ProductId, UserId};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use crate::config::ApiConfig;

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CategoryFilterRequest<'a> {
    categories: &'a [CategoryId],
}

#[derive(Serialize)]
struct AddToCartRequest {
    #[serde(rename = "productId")]
    product_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

#[derive(Serialize)]
struct MarkOrderedRequest<'a> {
    #[serde(rename = "cartIds")]
    cart_ids: &'a [CartLineId],
}

#[derive(Serialize)]
struct WishlistToggleRequest {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "productId")]
    product_id: ProductId,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the ARCVERSE backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("arcverse-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the body of a successful response.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(message));
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn send_list<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, ApiError> {
        Ok(self.send::<ListResponse<T>>(request).await?.into_vec())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .send_list(self.inner.client.get(self.url("/products")))
            .await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get one product. With a user, the response carries their wishlist
    /// state in `is_favourite`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown products.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(
        &self,
        id: ProductId,
        user_id: Option<UserId>,
    ) -> Result<Product, ApiError> {
        let path = match user_id {
            Some(user_id) => format!("/products/{id}?userId={user_id}"),
            None => format!("/products/{id}"),
        };
        self.send(self.inner.client.get(self.url(&path))).await
    }

    /// Products belonging to any of the given categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn filter_by_categories(
        &self,
        categories: &[CategoryId],
    ) -> Result<Vec<Product>, ApiError> {
        self.send_list(
            self.inner
                .client
                .post(self.url("/products/filter-by-categories"))
                .json(&CategoryFilterRequest { categories }),
        )
        .await
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .send_list(self.inner.client.get(self.url("/categories")))
            .await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Check that the backend answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or failing.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.send_raw(self.inner.client.get(self.url("/categories")))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the backend's message for bad
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.send(
            self.inner
                .client
                .post(self.url("/users/login"))
                .json(&LoginRequest { email, password }),
        )
        .await
    }

    /// Create a shopper account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the backend's message when the
    /// account cannot be created (e.g. email already registered).
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.send_raw(
            self.inner
                .client
                .post(self.url("/users"))
                .json(&RegisterRequest {
                    name,
                    email,
                    password,
                }),
        )
        .await
        .map(|_| ())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Current (not yet ordered) cart rows of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, ApiError> {
        self.send_list(self.inner.client.get(self.url(&format!("/cart/{user_id}"))))
            .await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.send_raw(
            self.inner
                .client
                .post(self.url(&format!("/cart/{user_id}/items")))
                .json(&AddToCartRequest {
                    product_id,
                    quantity,
                }),
        )
        .await
        .map(|_| ())
    }

    /// Set the quantity of one cart row.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.send_raw(
            self.inner
                .client
                .put(self.url(&format!("/cart/{user_id}/items/{line_id}")))
                .json(&UpdateQuantityRequest { quantity }),
        )
        .await
        .map(|_| ())
    }

    /// Remove a product's row from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_raw(
            self.inner
                .client
                .delete(self.url(&format!("/cart/{user_id}/items/{product_id}"))),
        )
        .await
        .map(|_| ())
    }

    /// Flip cart rows to "ordered". They then appear in order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn mark_ordered(&self, cart_ids: &[CartLineId]) -> Result<(), ApiError> {
        self.send_raw(
            self.inner
                .client
                .post(self.url("/cart/mark-ordered"))
                .json(&MarkOrderedRequest { cart_ids }),
        )
        .await
        .map(|_| ())
    }

    /// Previously ordered rows of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, user_id: UserId) -> Result<Vec<OrderLine>, ApiError> {
        self.send_list(
            self.inner
                .client
                .get(self.url(&format!("/cart/orders/{user_id}"))),
        )
        .await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add or remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn toggle_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistToggle, ApiError> {
        self.send(
            self.inner
                .client
                .post(self.url("/wishlist/toggle"))
                .json(&WishlistToggleRequest {
                    user_id,
                    product_id,
                }),
        )
        .await
    }

    /// Wishlisted products of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_wishlist(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, ApiError> {
        self.send_list(self.inner.client.get(self.url(&format!("/wishlist/{user_id}"))))
            .await
    }
}
