//! Data every full page needs for the shared layout.

use tower_sessions::Session;

use super::flash::{Flash, take_flash};
use super::session::{CurrentUser, keys};

/// Layout context: who is signed in, the pending flash and the cart badge.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub cart_count: u32,
}

impl PageContext {
    /// Load the layout context, consuming the pending flash.
    pub async fn load(session: &Session) -> Self {
        let user = session
            .get::<CurrentUser>(keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        let cart_count = if user.is_some() {
            cart_count(session).await
        } else {
            0
        };

        Self {
            user,
            flash: take_flash(session).await,
            cart_count,
        }
    }

    /// Show `message` as an error unless a flash is already pending. Used
    /// when a fetch fails and the page renders with what it has.
    pub fn fail_soft(&mut self, message: &str) {
        if self.flash.is_none() {
            self.flash = Some(Flash::error(message));
        }
    }

    /// Whether a shopper is signed in.
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Cart badge count stored in the session.
pub async fn cart_count(session: &Session) -> u32 {
    session
        .get::<u32>(keys::CART_COUNT)
        .await
        .ok()
        .flatten()
        .unwrap_or(0)
}

/// Update the cart badge count.
pub async fn set_cart_count(session: &Session, count: u32) {
    if let Err(e) = session.insert(keys::CART_COUNT, count).await {
        tracing::warn!("Failed to store cart count: {e}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_soft_keeps_existing_flash() {
        let mut page = PageContext {
            flash: Some(Flash::success("Added to cart")),
            ..PageContext::default()
        };
        page.fail_soft("Failed to load products");
        assert_eq!(page.flash.unwrap().message, "Added to cart");

        let mut page = PageContext::default();
        page.fail_soft("Failed to load products");
        assert_eq!(page.flash.as_ref().unwrap().message, "Failed to load products");
        assert!(!page.signed_in());
    }
}
