//! Backend REST API client for the admin console.
//!
//! Every management call carries the signed-in admin's bearer token; the
//! backend enforces the admin role again on its side.

mod client;

pub use client::{ApiClient, UploadFile};

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

    /// The token was rejected; the admin has to sign in again.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

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
    /// Whether the backend rejected the request itself, as opposed to failing.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }

    /// Message safe to show in a flash.
    ///
    /// Backend validation messages (4xx) are passed through; anything else
    /// becomes `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if self.is_client_error() => message.clone(),
            Self::Unauthorized(_) => "Your session has expired, please sign in again".to_string(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let rejected = ApiError::Status {
            status: 409,
            message: "Email already in use".to_string(),
        };
        assert_eq!(rejected.user_message("Failed to create user"), "Email already in use");

        let failed = ApiError::Status {
            status: 500,
            message: "stack trace".to_string(),
        };
        assert_eq!(failed.user_message("Failed to create user"), "Failed to create user");

        let expired = ApiError::Unauthorized("jwt expired".to_string());
        assert!(!expired.is_client_error());
        assert!(expired.user_message("x").contains("sign in again"));
    }
}
