//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use serde::{Deserialize, Serialize};

use arcverse_core::account::User;
use arcverse_core::{UserId, UserRole};

/// Session-stored shopper identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address as the backend reports it.
    pub email: String,
    /// Account role.
    pub role: UserRole,
}

impl CurrentUser {
    /// First name for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";

    /// Key for billing details between checkout steps.
    pub const BILLING: &str = "billing";

    /// Key for the summary of the most recent order.
    pub const LAST_ORDER: &str = "last_order";

    /// Key for the cart badge count.
    pub const CART_COUNT: &str = "cart_count";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let user = CurrentUser {
            id: UserId::new(1),
            name: "Grace Brewster Hopper".to_string(),
            email: "grace@arcverse.store".to_string(),
            role: UserRole::User,
        };
        assert_eq!(user.first_name(), "Grace");
    }

    #[test]
    fn test_from_backend_user() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 5, "name": "Lin", "email": "lin@arcverse.store", "role": "admin"
        }))
        .unwrap();
        let current = CurrentUser::from(user);
        assert_eq!(current.id, UserId::new(5));
        assert!(current.role.is_admin());
    }
}
