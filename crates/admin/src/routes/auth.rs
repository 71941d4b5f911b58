//! Authentication route handlers.
//!
//! Admins sign in with the same backend accounts as shoppers; only users
//! whose role is `admin` get a console session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdmin, clear_session, set_current_admin};
use crate::models::{CurrentAdmin, Flash, set_flash, take_flash};
use crate::state::AppState;

/// Shown when a valid non-admin account tries to sign in.
const NOT_AN_ADMIN: &str = "Access denied: administrator account required";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<Flash>,
    pub email: String,
}

/// Display the login page. Signed-in admins go to the dashboard.
#[instrument(skip(session, admin))]
pub async fn login_page(session: Session, OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: None,
        notice: take_flash(&session).await,
        email: String::new(),
    }
    .into_response()
}

fn login_error(status: StatusCode, message: impl Into<String>, email: String) -> Response {
    (
        status,
        LoginTemplate {
            error: Some(message.into()),
            notice: None,
            email,
        },
    )
        .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return login_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Email and password are required",
            form.email,
        );
    }

    let auth = match state.api().login(form.email.trim(), &form.password).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!("Admin login failed: {e}");
            let (status, message) = match &e {
                ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
                e if e.is_client_error() => {
                    (StatusCode::UNAUTHORIZED, e.user_message("Invalid credentials"))
                }
                e => (
                    StatusCode::BAD_GATEWAY,
                    e.user_message("Login failed. Please try again."),
                ),
            };
            return login_error(status, message, form.email);
        }
    };

    let user_id = auth.user.id;
    let Some(admin) = CurrentAdmin::from_login(auth.user, auth.token) else {
        tracing::warn!(user_id = %user_id, "Non-admin login attempt on console");
        return login_error(StatusCode::FORBIDDEN, NOT_AN_ADMIN, form.email);
    };

    if let Err(e) = session.cycle_id().await {
        tracing::warn!("Failed to cycle session id: {e}");
    }
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!("Failed to set session: {e}");
        return login_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong. Please try again.",
            form.email,
        );
    }

    set_sentry_user(&admin.id, Some(&admin.email));
    tracing::info!(admin_id = %admin.id, "Admin signed in");
    set_flash(&session, Flash::success(format!("Welcome back, {}", admin.name))).await;

    Redirect::to("/").into_response()
}

/// Sign out and drop the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_session(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/login")
}
