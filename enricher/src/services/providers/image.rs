//! Photo search adapter (Unsplash-compatible API)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

use shared::{EnrichmentKind, EnrichmentPayload, FetchError, ImageResult};
use crate::error::EnrichResult;
use crate::services::providers::http::{build_client, endpoint, require_query, send_json};
use crate::traits::UpstreamProvider;
use crate::types::ProviderQuery;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
    small: Option<String>,
}

pub struct UnsplashImageProvider {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl UnsplashImageProvider {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> EnrichResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
        })
    }
}

#[async_trait]
impl UpstreamProvider for UnsplashImageProvider {
    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::Image
    }

    /// Search by common name; photo libraries tag by the name people use
    async fn fetch(&self, query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError> {
        let search = require_query(&query.name)?;
        let url = endpoint(
            &self.base_url,
            "search/photos",
            &[("query", search.as_str()), ("per_page", "1"), ("orientation", "landscape")],
        )?;
        debug!(url = %url, "Searching photos");

        let response: SearchResponse = send_json(
            self.client
                .get(url)
                .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
                .header("Accept-Version", "v1"),
        )
        .await?;

        let photo = response.results.into_iter().next().ok_or(FetchError::NotFound)?;
        let url = photo
            .urls
            .regular
            .or(photo.urls.small)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| FetchError::Malformed("photo result has no usable url".to_string()))?;

        Ok(EnrichmentPayload::Image(ImageResult {
            url,
            placeholder: false,
        }))
    }
}
