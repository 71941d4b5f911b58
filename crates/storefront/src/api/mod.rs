//! Backend REST API client.
//!
//! The storefront owns no data: catalog, carts, wishlists and accounts all
//! live behind the ARCVERSE backend. [`ApiClient`] wraps those endpoints and
//! caches the public catalog reads.

mod cache;
mod client;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// Whether the backend rejected the request itself (4xx other than 404
    /// and 429), as opposed to failing.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }

    /// Message safe to show to a shopper.
    ///
    /// Backend validation messages (4xx) are passed through; anything else
    /// becomes `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if self.is_client_error() => message.clone(),
            Self::NotFound(message) if !message.is_empty() => message.clone(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");

        let err = ApiError::Status {
            status: 400,
            message: "Invalid quantity".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 400: Invalid quantity");
    }

    #[test]
    fn test_user_message_passes_client_errors_through() {
        let err = ApiError::Status {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let err = ApiError::Status {
            status: 500,
            message: "SequelizeDatabaseError: relation does not exist".to_string(),
        };
        assert!(!err.is_client_error());
        assert_eq!(err.user_message("Login failed"), "Login failed");
        assert_eq!(
            ApiError::RateLimited(3).user_message("x"),
            "Too many requests, please try again shortly"
        );
    }
}
