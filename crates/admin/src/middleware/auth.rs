//! Authentication extractors for admin.
//!
//! Provides extractors for requiring an admin session in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a signed-in admin.
///
/// Anonymous requests are redirected to the login page. A stored identity
/// without the admin role is refused with 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when an admin session is required.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// No session layer in front of the handler.
    Unauthorized,
    /// Signed in, but not as an admin.
    Forbidden,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only administrators can access this console",
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        if !admin.role.is_admin() {
            tracing::warn!(user_id = %admin.id, "Non-admin session refused");
            return Err(AdminAuthRejection::Forbidden);
        }

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdmin`, this does not reject anonymous requests.
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the whole session (logout, expired token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arcverse_core::{UserId, UserRole};
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    fn admin(role: UserRole) -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new(1),
            email: "root@arcverse.store".to_string(),
            name: "Root".to_string(),
            role,
            token: "jwt".to_string(),
        }
    }

    /// `/seed` stores the given identity, `/protected` requires an admin.
    fn app(seed: Option<CurrentAdmin>) -> Router {
        let seed = Arc::new(seed);
        Router::new()
            .route(
                "/seed",
                get(move |session: Session| {
                    let seed = Arc::clone(&seed);
                    async move {
                        if let Some(admin) = seed.as_ref() {
                            set_current_admin(&session, admin).await.unwrap();
                        }
                        "seeded"
                    }
                }),
            )
            .route(
                "/protected",
                get(|RequireAdmin(admin): RequireAdmin| async move { admin.name }),
            )
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    async fn protected_status(seed: Option<CurrentAdmin>) -> (StatusCode, Option<String>) {
        let app = app(seed);
        let seeded = app
            .clone()
            .oneshot(Request::builder().uri("/seed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = seeded
            .headers()
            .get("set-cookie")
            .map(|c| c.to_str().unwrap().split(';').next().unwrap().to_string());

        let mut request = Request::builder().uri("/protected");
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let location = response
            .headers()
            .get("location")
            .map(|l| l.to_str().unwrap().to_string());
        (response.status(), location)
    }

    #[tokio::test]
    async fn test_anonymous_redirected_to_login() {
        let (status, location) = protected_status(None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let (status, _) = protected_status(Some(admin(UserRole::User))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_allowed() {
        let (status, _) = protected_status(Some(admin(UserRole::Admin))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
