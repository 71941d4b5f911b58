//! User accounts, login responses and wishlist payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, UserId, UserRole, WishlistEntryId};

/// Minimum password length accepted by the signup form.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A backend user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// First letter of the name, upper-cased, for avatar badges.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Response of `POST /users/login` and `POST /users`.
///
/// Registration may omit the token, in which case the caller logs in
/// separately.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}

/// One row of `GET /wishlist/{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(default)]
    pub id: Option<WishlistEntryId>,
    #[serde(rename = "productId", alias = "ProductId")]
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// Response of `POST /wishlist/toggle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WishlistToggle {
    #[serde(rename = "isWishlisted")]
    pub is_wishlisted: bool,
    #[serde(default)]
    pub message: String,
}

impl WishlistToggle {
    /// Flash copy for the toggle result; the backend message wins when set.
    #[must_use]
    pub fn flash_message(&self) -> &str {
        if !self.message.trim().is_empty() {
            return &self.message;
        }
        if self.is_wishlisted {
            "Added to wishlist"
        } else {
            "Removed from wishlist"
        }
    }
}

/// Check a signup password.
///
/// # Errors
///
/// Returns the user-facing message when the password is too short.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_response_decodes() {
        let auth: AuthResponse = serde_json::from_value(json!({
            "user": {"id": 4, "name": "root", "email": "root@arcverse.store", "role": "admin",
                     "createdAt": "2026-01-02T03:04:05.000Z"},
            "token": "jwt-token"
        }))
        .unwrap();
        assert!(auth.user.is_admin());
        assert_eq!(auth.token.as_deref(), Some("jwt-token"));
        assert!(auth.user.created_at.is_some());
    }

    #[test]
    fn test_user_role_defaults_to_user() {
        let user: User =
            serde_json::from_value(json!({"id": 1, "name": "ivy", "email": "ivy@a.io"})).unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.initial(), "I");
    }

    #[test]
    fn test_wishlist_toggle_message() {
        let added: WishlistToggle =
            serde_json::from_value(json!({"isWishlisted": true, "message": ""})).unwrap();
        assert_eq!(added.flash_message(), "Added to wishlist");

        let removed: WishlistToggle = serde_json::from_value(json!({"isWishlisted": false})).unwrap();
        assert_eq!(removed.flash_message(), "Removed from wishlist");

        let custom: WishlistToggle =
            serde_json::from_value(json!({"isWishlisted": true, "message": "Saved!"})).unwrap();
        assert_eq!(custom.flash_message(), "Saved!");
    }

    #[test]
    fn test_wishlist_entry_decodes() {
        let entry: WishlistEntry = serde_json::from_value(json!({
            "id": 2, "productId": 7, "name": "Arc Lamp", "price": "59.00"
        }))
        .unwrap();
        assert_eq!(entry.product_id, ProductId::new(7));
        assert_eq!(entry.price, Some(Price::from_cents(5900)));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert_eq!(
            validate_password("short"),
            Err("Password must be at least 8 characters".to_string())
        );
    }
}
