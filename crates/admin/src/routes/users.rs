//! User management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::account::{User, validate_password};
use arcverse_core::payloads::UserPayload;
use arcverse_core::{Email, UserId, UserRole};

use super::after_failure;
use crate::api::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{AdminPage, CurrentAdmin, Flash, set_flash};
use crate::state::AppState;

/// User table row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub joined: String,
    pub is_self: bool,
}

impl UserRow {
    fn new(user: User, current: UserId) -> Self {
        Self {
            id: user.id,
            is_self: user.id == current,
            joined: user
                .created_at
                .map(|at| at.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }

    /// Badge class for the role column.
    #[must_use]
    pub const fn role_class(&self) -> &'static str {
        if self.role.is_admin() {
            "badge badge-admin"
        } else {
            "badge"
        }
    }
}

/// User form data, shared by create and update.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
}

impl UserForm {
    /// Check the form. A password is required on create and optional on
    /// update, where blank means unchanged.
    fn validate(&self, password_required: bool) -> Result<UserPayload, String> {
        if self.name.trim().chars().count() < 2 {
            return Err("Name must be at least 2 characters".to_string());
        }
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address")?;
        if password_required || !self.password.is_empty() {
            validate_password(&self.password)?;
        }
        Ok(UserPayload::new(
            &self.name,
            email.as_str(),
            &self.password,
            self.role,
        ))
    }
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub page: AdminPage,
    pub users: Vec<UserRow>,
}

/// Edit user template.
#[derive(Template, WebTemplate)]
#[template(path = "users/edit.html")]
pub struct EditUserTemplate {
    pub page: AdminPage,
    pub user: UserRow,
}

async fn page(state: &AppState, session: &Session, admin: &CurrentAdmin) -> AdminPage {
    AdminPage::load(
        session,
        admin,
        "/users",
        state.config().storefront_url.as_deref(),
    )
    .await
}

/// List users with the create form.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let result = state.api().list_users(&admin.token).await;
    if let Err(e @ ApiError::Unauthorized(_)) = &result {
        return after_failure(&session, e, "Failed to fetch users", "/")
            .await
            .into_response();
    }

    let mut page = page(&state, &session, &admin).await;
    let users = result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch users: {e}");
        page.fail_soft("Failed to fetch users");
        Vec::new()
    });

    UsersTemplate {
        page,
        users: users
            .into_iter()
            .map(|u| UserRow::new(u, admin.id))
            .collect(),
    }
    .into_response()
}

/// Create a user.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<UserForm>,
) -> Redirect {
    let payload = match form.validate(true) {
        Ok(payload) => payload,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to("/users");
        }
    };

    match state.api().create_user(&admin.token, &payload).await {
        Ok(()) => {
            tracing::info!(role = %payload.role, "User created");
            set_flash(&session, Flash::success("User created successfully")).await;
            Redirect::to("/users")
        }
        Err(e) => {
            tracing::error!("Failed to create user: {e}");
            after_failure(&session, &e, "Failed to create user", "/users").await
        }
    }
}

/// Edit form for one user.
#[instrument(skip(state, session, admin))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    let users = match state.api().list_users(&admin.token).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to fetch users: {e}");
            return after_failure(&session, &e, "Failed to fetch users", "/users")
                .await
                .into_response();
        }
    };

    let Some(user) = users.into_iter().find(|u| u.id == id) else {
        return AppError::NotFound(format!("user {id}")).into_response();
    };

    EditUserTemplate {
        page: page(&state, &session, &admin).await,
        user: UserRow::new(user, admin.id),
    }
    .into_response()
}

/// Update a user. A blank password keeps the current one.
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<UserForm>,
) -> Redirect {
    let edit_path = format!("/users/{id}/edit");

    if id == admin.id && !form.role.is_admin() {
        set_flash(&session, Flash::error("You cannot remove your own admin role")).await;
        return Redirect::to(&edit_path);
    }

    let payload = match form.validate(false) {
        Ok(payload) => payload,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to(&edit_path);
        }
    };

    match state.api().update_user(&admin.token, id, &payload).await {
        Ok(()) => {
            tracing::info!(user_id = %id, password_changed = payload.password.is_some(), "User updated");
            set_flash(&session, Flash::success("User updated successfully")).await;
            Redirect::to("/users")
        }
        Err(e) => {
            tracing::error!("Failed to update user: {e}");
            after_failure(&session, &e, "Failed to update user", &edit_path).await
        }
    }
}

/// Delete a user. Admins cannot delete themselves.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Redirect {
    if id == admin.id {
        set_flash(&session, Flash::error("You cannot delete your own account")).await;
        return Redirect::to("/users");
    }

    match state.api().delete_user(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            set_flash(&session, Flash::success("User deleted successfully")).await;
            Redirect::to("/users")
        }
        Err(e) => {
            tracing::error!("Failed to delete user: {e}");
            after_failure(&session, &e, "Failed to delete user", "/users").await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str, role: UserRole) -> UserForm {
        UserForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }

    #[test]
    fn test_create_requires_password() {
        let err = form("Ada", "ada@arcverse.store", "", UserRole::User)
            .validate(true)
            .unwrap_err();
        assert_eq!(err, "Password must be at least 8 characters");
    }

    #[test]
    fn test_update_allows_blank_password() {
        let payload = form("Ada", "ada@arcverse.store", "", UserRole::Admin)
            .validate(false)
            .unwrap();
        assert!(payload.password.is_none());
        assert_eq!(payload.role, UserRole::Admin);

        let err = form("Ada", "ada@arcverse.store", "short", UserRole::Admin)
            .validate(false)
            .unwrap_err();
        assert!(err.contains("at least 8"));
    }

    #[test]
    fn test_form_rejects_bad_fields() {
        assert!(form("A", "ada@arcverse.store", "longenough", UserRole::User)
            .validate(true)
            .is_err());
        assert_eq!(
            form("Ada", "nope", "longenough", UserRole::User)
                .validate(true)
                .unwrap_err(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_user_row_marks_self() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "Root", "email": "root@arcverse.store", "role": "admin",
            "createdAt": "2026-03-09T10:00:00Z"
        }))
        .unwrap();
        let row = UserRow::new(user, UserId::new(3));
        assert!(row.is_self);
        assert_eq!(row.joined, "Mar 9, 2026");
        assert_eq!(row.role_class(), "badge badge-admin");
    }
}
