//! Layout data shared by every console page.

use tower_sessions::Session;

use super::flash::{Flash, take_flash};
use super::session::CurrentAdmin;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Layout context: signed-in admin, active nav entry, pending flash.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub storefront_url: Option<String>,
}

impl AdminPage {
    /// Load the layout context, consuming the pending flash.
    pub async fn load(
        session: &Session,
        admin: &CurrentAdmin,
        current_path: &'static str,
        storefront_url: Option<&str>,
    ) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path,
            flash: take_flash(session).await,
            storefront_url: storefront_url.map(String::from),
        }
    }

    /// Show `message` as an error unless a flash is already pending.
    pub fn fail_soft(&mut self, message: &str) {
        if self.flash.is_none() {
            self.flash = Some(Flash::error(message));
        }
    }

    /// CSS class for a sidebar link.
    #[must_use]
    pub fn nav_class(&self, path: &str) -> &'static str {
        let active = if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        };
        if active { "nav-item active" } else { "nav-item" }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(current_path: &'static str) -> AdminPage {
        AdminPage {
            admin_user: AdminUserView {
                name: "Root".to_string(),
                email: "root@arcverse.store".to_string(),
            },
            current_path,
            flash: None,
            storefront_url: None,
        }
    }

    #[test]
    fn test_nav_class() {
        let users = page("/users");
        assert_eq!(users.nav_class("/users"), "nav-item active");
        assert_eq!(users.nav_class("/"), "nav-item");

        let dashboard = page("/");
        assert_eq!(dashboard.nav_class("/"), "nav-item active");
        assert_eq!(dashboard.nav_class("/products"), "nav-item");
    }

    #[test]
    fn test_fail_soft_keeps_pending_flash() {
        let mut p = page("/");
        p.flash = Some(Flash::success("User created successfully"));
        p.fail_soft("Failed to fetch users");
        assert_eq!(p.flash.unwrap().message, "User created successfully");
    }
}
