//! Service health checks.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{CliError, api_client};

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// `{base}/health/ready` for a service base URL.
fn readiness_url(base: &str) -> Result<Url, url::ParseError> {
    let base = Url::parse(base.trim())?;
    let path = format!("{}/health/ready", base.path().trim_end_matches('/'));
    let mut url = base;
    url.set_path(&path);
    Ok(url)
}

async fn check_service(client: &Client, name: &str, base: &str) -> bool {
    let url = match readiness_url(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("{name}: invalid URL {base}: {e}");
            return false;
        }
    };
    match client.get(url.clone()).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::info!("{name}: ready ({url})");
            true
        }
        Ok(response) => {
            tracing::error!("{name}: not ready, status {} ({url})", response.status());
            false
        }
        Err(e) => {
            tracing::error!("{name}: unreachable ({url}): {e}");
            false
        }
    }
}

/// Check the backend, then the storefront and console when their URLs are set.
///
/// # Errors
///
/// Returns an error if the backend settings are invalid or any check fails.
pub async fn all() -> Result<(), CliError> {
    let mut failed = 0;

    let api = api_client()?;
    match api.ping().await {
        Ok(()) => tracing::info!("backend: ready"),
        Err(e) => {
            tracing::error!("backend: {e}");
            failed += 1;
        }
    }

    let client = Client::builder()
        .timeout(CHECK_TIMEOUT)
        .build()
        .map_err(arcverse_admin::api::ApiError::from)?;

    for (name, var) in [("storefront", "STOREFRONT_BASE_URL"), ("admin", "ADMIN_BASE_URL")] {
        match std::env::var(var) {
            Ok(base) if !base.trim().is_empty() => {
                if !check_service(&client, name, &base).await {
                    failed += 1;
                }
            }
            _ => tracing::warn!("{name}: skipped, {var} is not set"),
        }
    }

    if failed > 0 {
        return Err(CliError::Unhealthy(failed));
    }
    Ok(())
}
