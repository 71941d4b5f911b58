//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! ARCVERSE_NEW_ADMIN_PASSWORD=... arc-cli admin create -e ops@arcverse.store -n "Ops"
//! ```
//!
//! The backend only lets admins create admins, so the command first signs in
//! with `ARCVERSE_ADMIN_EMAIL` / `ARCVERSE_ADMIN_PASSWORD`.

use secrecy::{ExposeSecret, SecretString};

use arcverse_core::account::validate_password;
use arcverse_core::payloads::UserPayload;
use arcverse_core::{Email, UserRole};

use super::{CliError, api_client, required_env, sign_in};

/// Check the new account's fields before any network call.
fn admin_payload(email: &str, name: &str, password: &str) -> Result<UserPayload, CliError> {
    let email = Email::parse(email).map_err(|e| CliError::Invalid(format!("{email}: {e}")))?;
    if name.trim().chars().count() < 2 {
        return Err(CliError::Invalid(
            "name must be at least 2 characters".to_string(),
        ));
    }
    validate_password(password).map_err(CliError::Invalid)?;
    Ok(UserPayload::new(
        name,
        email.as_str(),
        password,
        UserRole::Admin,
    ))
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the input is invalid, the operator cannot sign in,
/// or the backend rejects the new account.
pub async fn create_admin(email: &str, name: &str) -> Result<(), CliError> {
    let password = SecretString::from(required_env("ARCVERSE_NEW_ADMIN_PASSWORD")?);
    let payload = admin_payload(email, name, password.expose_secret())?;

    let api = api_client()?;
    let token = sign_in(&api).await?;

    tracing::info!("Creating admin account: {}", payload.email);
    api.create_user(token.expose_secret(), &payload).await?;
    tracing::info!("Admin account created: {} ({})", payload.email, payload.name);

    Ok(())
}
