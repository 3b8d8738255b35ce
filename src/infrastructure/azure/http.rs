use reqwest::{Client as ReqwestClient, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::error::StoreError;

/// Build the pooled HTTP client shared by every Azure adapter
pub fn build_http_client(timeout: Duration) -> Result<ReqwestClient, StoreError> {
    ReqwestClient::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| StoreError::Network(format!("Failed to build HTTP client: {e}")))
}

/// Normalize an endpoint to `scheme://host[:port]` without a trailing slash
pub(crate) fn normalize_endpoint(endpoint: &str) -> Result<String, StoreError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| StoreError::InvalidEndpoint(endpoint.to_string()))?;
    if url.host_str().is_none() || !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn map_transport_error(err: &reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_decode() {
        StoreError::Decode(err.to_string())
    } else {
        StoreError::Network(err.to_string())
    }
}

/// Check the status code and parse a JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        return Err(StoreError::from_status(status.as_u16(), body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}
