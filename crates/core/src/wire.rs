//! Response envelopes shared by every backend endpoint.
//!
//! List endpoints answer either with a bare JSON array or with an object
//! wrapping the array (`{"products": [...]}`, `{"data": [...]}`). Error
//! responses carry `{"message": "..."}` or `{"error": "..."}`.

use serde::Deserialize;

/// A list payload in either of the shapes the backend produces.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "products",
            alias = "categories",
            alias = "users",
            alias = "items",
            alias = "cart",
            alias = "orders",
            alias = "wishlist"
        )]
        data: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    /// The items, whichever shape they arrived in.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// Body of a failed request.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    /// The first non-empty message field.
    #[must_use]
    pub fn message(self) -> Option<String> {
        self.message
            .into_iter()
            .chain(self.error)
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
    }
}

/// Extract a human readable message from an error response body.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message)
}

/// Response of `POST /uploads/single`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}

/// Response of `POST /uploads/multiple`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFiles {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_shapes() {
        let bare: ListResponse<i64> = serde_json::from_str("[1,2]").unwrap();
        let wrapped: ListResponse<i64> = serde_json::from_str(r#"{"products":[3]}"#).unwrap();
        let data: ListResponse<i64> = serde_json::from_str(r#"{"data":[]}"#).unwrap();

        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(wrapped.into_vec(), vec![3]);
        assert!(data.into_vec().is_empty());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(r#"{"error":"Email already in use"}"#).as_deref(),
            Some("Email already in use")
        );
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
