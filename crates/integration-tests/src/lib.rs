//! End-to-end tests for the ARCVERSE storefront and admin console.
//!
//! Each test starts a [`backend::FakeBackend`] and the app under test on
//! ephemeral ports, then drives the app over HTTP with a cookie-enabled
//! client that does not follow redirects, so every `303` can be asserted.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p arcverse-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;

use std::net::SocketAddr;

use axum::Router;
use reqwest::{Client, Response, redirect::Policy};
use secrecy::SecretString;
use url::Url;

use backend::FakeBackend;

/// Serve `router` on an ephemeral localhost port.
///
/// # Panics
///
/// Panics if the port cannot be bound.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });
    addr
}

/// Session secret used by every test app.
fn test_secret() -> SecretString {
    SecretString::from("k7Qp2Vx9Lm4Rt8Wz1Yb6Nc3Hf5Jd0Gs")
}

/// An app under test plus the backend it talks to.
pub struct TestApp {
    pub base_url: String,
    pub backend: FakeBackend,
    pub client: Client,
}

/// Serve a seeded backend under `/api`, as the real one is deployed.
async fn start_backend() -> (FakeBackend, Url) {
    let backend = FakeBackend::seeded();
    let addr = spawn(Router::new().nest("/api", backend.router())).await;
    let url = Url::parse(&format!("http://{addr}/api")).expect("backend url");
    (backend, url)
}

impl TestApp {
    /// Start the storefront against a seeded backend.
    ///
    /// `admin_base_url` enables the redirect of admins to the console.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot start.
    pub async fn storefront(admin_base_url: Option<&str>) -> Self {
        let (backend, api_url) = start_backend().await;

        let config = arcverse_storefront::config::StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_secret: test_secret(),
            api: arcverse_storefront::config::ApiConfig::new(api_url),
            admin_base_url: admin_base_url.map(String::from),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = arcverse_storefront::state::AppState::new(config).expect("storefront state");
        let addr = spawn(arcverse_storefront::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            backend,
            client: client(),
        }
    }

    /// Start the admin console against a seeded backend.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot start.
    pub async fn admin() -> Self {
        let (backend, api_url) = start_backend().await;

        let config = arcverse_admin::config::AdminConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_secret: test_secret(),
            api: arcverse_admin::config::ApiConfig::new(api_url),
            storefront_url: Some("http://127.0.0.1:3000".to_string()),
            upload_limit_bytes: 5 * 1024 * 1024,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = arcverse_admin::state::AppState::new(config).expect("admin state");
        let addr = spawn(arcverse_admin::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            backend,
            client: client(),
        }
    }

    /// Absolute URL of `path` on the app.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// POST a urlencoded form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// Sign in through the app's login form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// GET a page and return its body.
    ///
    /// # Panics
    ///
    /// Panics if the request or body read fails.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("response body")
    }
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("test client")
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the response has no valid `Location`.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect location")
        .to_str()
        .expect("ascii location")
        .to_string()
}
