use geodatahub_core::error::{GeodatahubError, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

pub(crate) fn build_client(backend: &str, timeout: Duration, headers: HeaderMap) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| GeodatahubError::BackendUnavailable {
            backend: backend.to_string(),
            reason: format!("Failed to build HTTP client: {}", e),
        })
}

/// Map a failed send to a backend error
pub(crate) fn send_error(backend: &str, err: reqwest::Error) -> GeodatahubError {
    let reason = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("request failed: {}", err)
    };
    GeodatahubError::BackendUnavailable {
        backend: backend.to_string(),
        reason,
    }
}

/// Pass successful responses through; turn the rest into backend errors
pub(crate) async fn check_status(backend: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = format!("API error ({}): {}", status, body.trim());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(GeodatahubError::BackendUnavailable {
            backend: backend.to_string(),
            reason,
        })
    } else {
        Err(GeodatahubError::BackendError {
            backend: backend.to_string(),
            reason,
        })
    }
}

pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    backend: &str,
    response: reqwest::Response,
) -> Result<T> {
    response.json().await.map_err(|e| {
        if e.is_timeout() {
            send_error(backend, e)
        } else {
            GeodatahubError::BackendError {
                backend: backend.to_string(),
                reason: format!("Failed to parse response: {}", e),
            }
        }
    })
}
