//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use arcverse_core::account::User;
use arcverse_core::{UserId, UserRole};

/// Session-stored admin identity.
///
/// Holds the backend token so management calls can be made on the admin's
/// behalf. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: String,
    /// Admin's display name.
    pub name: String,
    /// Always `Admin` for a stored session; kept so the extractor can
    /// re-check it.
    pub role: UserRole,
    /// Bearer token issued by `POST /users/login`.
    pub token: String,
}

impl CurrentAdmin {
    /// Build the session identity from a login response. Returns `None`
    /// unless the user is an admin and a token was issued.
    #[must_use]
    pub fn from_login(user: User, token: Option<String>) -> Option<Self> {
        if !user.is_admin() {
            return None;
        }
        let token = token.filter(|t| !t.is_empty())?;
        Some(Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            token,
        })
    }
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: &str) -> User {
        serde_json::from_value(json!({
            "id": 9, "name": "Root Admin", "email": "root@arcverse.store", "role": role
        }))
        .unwrap()
    }

    #[test]
    fn test_from_login_requires_admin_and_token() {
        assert!(CurrentAdmin::from_login(user("user"), Some("t".to_string())).is_none());
        assert!(CurrentAdmin::from_login(user("admin"), None).is_none());
        assert!(CurrentAdmin::from_login(user("admin"), Some(String::new())).is_none());

        let admin = CurrentAdmin::from_login(user("admin"), Some("jwt".to_string())).unwrap();
        assert_eq!(admin.id, UserId::new(9));
        assert_eq!(admin.token, "jwt");
    }

    #[test]
    fn test_debug_redacts_token() {
        let admin =
            CurrentAdmin::from_login(user("admin"), Some("eyJhbGciOi.secret".to_string())).unwrap();
        let debug = format!("{admin:?}");
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(debug.contains("root@arcverse.store"));
    }
}
