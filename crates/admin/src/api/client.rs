//! HTTP client for the management endpoints.
//!
//! Nothing is cached: the console always shows what the backend holds.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use arcverse_core::account::{AuthResponse, User};
use arcverse_core::catalog::{Category, Product};
use arcverse_core::payloads::{CategoryPayload, ProductPayload, UserPayload};
use arcverse_core::wire::{ListResponse, UploadedFile, UploadedFiles, error_message};
use arcverse_core::{CategoryId, ProductId, UserId};

use super::ApiError;
use crate::config::ApiConfig;

/// Uploads may take a while on slow links.
const UPLOAD_TIMEOUT_FACTOR: u32 = 4;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// A file received from the product form, ready to forward.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

/// Client for the ARCVERSE backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    upload_timeout: std::time::Duration,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("arcverse-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                upload_timeout: config.timeout * UPLOAD_TIMEOUT_FACTOR,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.inner.client.get(self.url(path)).bearer_auth(token)
    }

    fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.inner.client.post(self.url(path)).bearer_auth(token)
    }

    fn put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.inner.client.put(self.url(path)).bearer_auth(token)
    }

    fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.inner.client.delete(self.url(path)).bearer_auth(token)
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

        if status.is_success() {
            return Ok(body);
        }

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

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

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

    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(request).await.map(|_| ())
    }

    /// Check that the backend answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or failing.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.send_empty(self.inner.client.get(self.url("/categories")))
            .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] or [`ApiError::Status`] carrying the
    /// backend's message for bad credentials.
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

    // =========================================================================
    // Users
    // =========================================================================

    /// Every user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        self.send_list(self.get("/users", token)).await
    }

    /// Create a user with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn create_user(&self, token: &str, user: &UserPayload) -> Result<(), ApiError> {
        self.send_empty(self.post("/users", token).json(user)).await
    }

    /// Update a user. A payload without password keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_user(
        &self,
        token: &str,
        id: UserId,
        user: &UserPayload,
    ) -> Result<(), ApiError> {
        self.send_empty(self.put(&format!("/users/{id}"), token).json(user))
            .await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_user(&self, token: &str, id: UserId) -> Result<(), ApiError> {
        self.send_empty(self.delete(&format!("/users/{id}"), token))
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_categories(&self, token: &str) -> Result<Vec<Category>, ApiError> {
        self.send_list(self.get("/categories", token)).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn create_category(
        &self,
        token: &str,
        category: &CategoryPayload,
    ) -> Result<(), ApiError> {
        self.send_empty(self.post("/categories", token).json(category))
            .await
    }

    /// Rename or re-describe a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_category(
        &self,
        token: &str,
        id: CategoryId,
        category: &CategoryPayload,
    ) -> Result<(), ApiError> {
        self.send_empty(self.put(&format!("/categories/{id}"), token).json(category))
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_category(&self, token: &str, id: CategoryId) -> Result<(), ApiError> {
        self.send_empty(self.delete(&format!("/categories/{id}"), token))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_products(&self, token: &str) -> Result<Vec<Product>, ApiError> {
        self.send_list(self.get("/products", token)).await
    }

    /// Create a product from already uploaded image URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        token: &str,
        product: &ProductPayload,
    ) -> Result<(), ApiError> {
        self.send_empty(self.post("/products", token).json(product))
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &str, id: ProductId) -> Result<(), ApiError> {
        self.send_empty(self.delete(&format!("/products/{id}"), token))
            .await
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Upload one image; returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the file type is unusable.
    #[instrument(skip(self, token, file), fields(file = %file.file_name))]
    pub async fn upload_single(&self, token: &str, file: UploadFile) -> Result<String, ApiError> {
        let form = Form::new().part("image", file.into_part()?);
        let uploaded: UploadedFile = self
            .send(
                self.post("/uploads/single", token)
                    .timeout(self.inner.upload_timeout)
                    .multipart(form),
            )
            .await?;
        Ok(uploaded.url)
    }

    /// Upload several images in one request; returns their URLs in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or a file type is unusable.
    #[instrument(skip(self, token, files), fields(count = files.len()))]
    pub async fn upload_multiple(
        &self,
        token: &str,
        files: Vec<UploadFile>,
    ) -> Result<Vec<String>, ApiError> {
        let mut form = Form::new();
        for file in files {
            form = form.part("images", file.into_part()?);
        }
        let uploaded: UploadedFiles = self
            .send(
                self.post("/uploads/multiple", token)
                    .timeout(self.inner.upload_timeout)
                    .multipart(form),
            )
            .await?;
        Ok(uploaded.urls)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ApiConfig::new(Url::parse("http://localhost:5000/api/").unwrap());
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/users"), "http://localhost:5000/api/users");
        assert_eq!(client.inner.upload_timeout, Duration::from_secs(40));
    }

    #[test]
    fn test_bad_content_type_rejected() {
        let file = UploadFile {
            file_name: "x.png".to_string(),
            content_type: "not a mime type".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(file.into_part().is_err());
    }

    #[test]
    fn test_upload_debug_hides_bytes() {
        let file = UploadFile {
            file_name: "main.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; 2048],
        };
        let debug = format!("{file:?}");
        assert!(debug.contains("len: 2048"));
        assert!(!debug.contains("0, 0"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let mut config = ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
        config.timeout = Duration::from_millis(500);
        let client = ApiClient::new(&config).unwrap();
        assert!(matches!(client.ping().await.unwrap_err(), ApiError::Http(_)));
    }
}
