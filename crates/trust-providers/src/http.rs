use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use trust_core::{CertifyError, Result, Stage};

/// Builds a client whose every request is bounded by `timeout`.
pub(crate) fn client(provider: &'static str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CertifyError::Configuration(format!("{provider} client: {e}")))
}

/// Sends `request` and decodes the body as JSON.
///
/// Non-2xx statuses and undecodable bodies are provider errors. URLs are
/// stripped from transport errors because they carry API keys.
pub(crate) async fn fetch_json(
    provider: &'static str,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, timeout, e))?;

    let status = response.status();
    debug!(provider, %status, "provider responded");
    if !status.is_success() {
        return Err(CertifyError::ProviderRequest {
            provider,
            message: format!("HTTP {status}"),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| transport_error(provider, timeout, e))
}

fn transport_error(provider: &'static str, timeout: Duration, err: reqwest::Error) -> CertifyError {
    if err.is_timeout() {
        CertifyError::Timeout {
            stage: Stage::Facts,
            after: timeout,
        }
    } else {
        CertifyError::ProviderRequest {
            provider,
            message: err.without_url().to_string(),
        }
    }
}

/// Joins a base URL and a relative path with exactly one slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
