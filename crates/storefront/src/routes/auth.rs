//! Authentication route handlers.
//!
//! Credentials are checked by the backend (`POST /users/login`); the
//! storefront only keeps the returned user in its session. Admins are sent
//! on to the admin console when one is configured.

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

use arcverse_core::Email;
use arcverse_core::account::validate_password;

use super::cart::load_cart;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_session, set_current_user};
use crate::models::{CurrentUser, Flash, PageContext, set_flash};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

/// Check signup fields before calling the backend.
fn validate_signup(form: &SignupForm) -> Result<Email, String> {
    if form.name.trim().chars().count() < 2 {
        return Err("Name must be at least 2 characters".to_string());
    }
    let email = Email::parse(&form.email).map_err(|_| "Please enter a valid email address")?;
    validate_password(&form.password)?;
    Ok(email)
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in shoppers go home.
#[instrument(skip(session, user))]
pub async fn login_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        page: PageContext::load(&session).await,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let render_error = |page: PageContext, status: StatusCode, message: String, email: String| {
        (
            status,
            LoginTemplate {
                page,
                error: Some(message),
                email,
            },
        )
            .into_response()
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return render_error(
            PageContext::load(&session).await,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Email and password are required".to_string(),
            form.email,
        );
    }

    let auth = match state.api().login(form.email.trim(), &form.password).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            let status = if e.is_client_error() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_GATEWAY
            };
            return render_error(
                PageContext::load(&session).await,
                status,
                e.user_message("Login failed. Please try again."),
                form.email,
            );
        }
    };

    if auth.user.is_admin()
        && let Some(admin_url) = &state.config().admin_base_url
    {
        tracing::info!(user_id = %auth.user.id, "Admin signed in on storefront, redirecting");
        return Redirect::to(&format!("{}/login", admin_url.trim_end_matches('/'))).into_response();
    }

    let user = CurrentUser::from(auth.user);

    if let Err(e) = session.cycle_id().await {
        tracing::warn!("Failed to cycle session id: {e}");
    }
    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return render_error(
            PageContext::load(&session).await,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong. Please try again.".to_string(),
            form.email,
        );
    }

    set_sentry_user(&user.id, Some(&user.email));
    if let Err(e) = load_cart(&state, &session, user.id).await {
        tracing::warn!("Failed to load cart count after login: {e}");
    }

    tracing::info!(user_id = %user.id, "Shopper signed in");
    set_flash(
        &session,
        Flash::success(format!("Welcome back, {}", user.first_name())),
    )
    .await;

    Redirect::to("/").into_response()
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
#[instrument(skip(session, user))]
pub async fn signup_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SignupTemplate {
        page: PageContext::load(&session).await,
        error: None,
        name: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle signup form submission. New accounts sign in separately.
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let error = match validate_signup(&form) {
        Ok(email) => match state
            .api()
            .register(form.name.trim(), email.as_str(), &form.password)
            .await
        {
            Ok(()) => {
                tracing::info!("Account created");
                set_flash(&session, Flash::success("Account created, please sign in")).await;
                return Redirect::to("/login").into_response();
            }
            Err(e) => {
                tracing::warn!("Signup failed: {e}");
                (
                    if e.is_client_error() {
                        StatusCode::UNPROCESSABLE_ENTITY
                    } else {
                        StatusCode::BAD_GATEWAY
                    },
                    e.user_message("Signup failed. Please try again."),
                )
            }
        },
        Err(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
    };

    let (status, message) = error;
    (
        status,
        SignupTemplate {
            page: PageContext::load(&session).await,
            error: Some(message),
            name: form.name,
            email: form.email,
        },
    )
        .into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out and drop everything in the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_session(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str) -> SignupForm {
        SignupForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(validate_signup(&form("Ada Lovelace", "ada@example.com", "longenough")).is_ok());
        assert_eq!(
            validate_signup(&form("A", "ada@example.com", "longenough")).unwrap_err(),
            "Name must be at least 2 characters"
        );
        assert_eq!(
            validate_signup(&form("Ada", "not-an-email", "longenough")).unwrap_err(),
            "Please enter a valid email address"
        );
        assert_eq!(
            validate_signup(&form("Ada", "ada@example.com", "short")).unwrap_err(),
            "Password must be at least 8 characters"
        );
    }
}
