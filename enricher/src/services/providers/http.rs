//! HTTP plumbing shared by the provider adapters

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use shared::FetchError;
use crate::error::{EnrichError, EnrichResult};

const USER_AGENT: &str = concat!("menagerie-enricher/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(timeout: Duration) -> EnrichResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| EnrichError::config(format!("failed to build HTTP client: {e}")))
}

/// Strip control characters and collapse whitespace before a name goes on the wire
pub fn sanitize_query(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `base` + `path` with URL-encoded query parameters
pub(crate) fn endpoint(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let mut url = Url::parse(&raw).map_err(|e| FetchError::Unreachable(format!("invalid endpoint {raw}: {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

pub(crate) fn require_query(raw: &str) -> Result<String, FetchError> {
    let query = sanitize_query(raw);
    if query.is_empty() {
        return Err(FetchError::NotFound);
    }
    Ok(query)
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_decode() {
        FetchError::Malformed(error.to_string())
    } else {
        FetchError::Unreachable(error.to_string())
    }
}

pub(crate) fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FetchError::Unreachable(format!("credentials rejected ({status})"))
        }
        _ => FetchError::Unreachable(format!("upstream returned {status}")),
    })
}

/// Send a request and decode a JSON body into `T`
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchError> {
    let response = request.send().await.map_err(map_transport_error)?;
    check_status(response.status())?;
    let body = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Empty strings from upstream count as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
