//! Command implementations.

pub mod admin;
pub mod ping;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use arcverse_admin::api::{ApiClient, ApiError};
use arcverse_admin::config::{ApiConfig, ConfigError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend settings are missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// The operator account is not an admin.
    #[error("{0} is not an administrator account")]
    NotAnAdmin(String),

    /// Invalid command input.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// File could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Catalog file is not valid YAML.
    #[error("Invalid catalog file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more health checks failed.
    #[error("{0} service check(s) failed")]
    Unhealthy(usize),
}

fn required_env(key: &'static str) -> Result<String, CliError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CliError::MissingEnvVar(key))
}

/// Backend client from `ARCVERSE_API_URL`.
fn api_client() -> Result<ApiClient, CliError> {
    let config = ApiConfig::from_env()?;
    Ok(ApiClient::new(&config)?)
}

/// Sign in as the operator admin and return the bearer token.
async fn sign_in(api: &ApiClient) -> Result<SecretString, CliError> {
    let email = required_env("ARCVERSE_ADMIN_EMAIL")?;
    let password = SecretString::from(required_env("ARCVERSE_ADMIN_PASSWORD")?);

    let auth = api.login(&email, password.expose_secret()).await?;
    if !auth.user.is_admin() {
        return Err(CliError::NotAnAdmin(email));
    }
    let token = auth
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CliError::Invalid("login response carried no token".to_string()))?;

    tracing::info!(admin = %auth.user.email, "Signed in");
    Ok(SecretString::from(token))
}
