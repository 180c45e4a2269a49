//! Recent sightings adapter (iNaturalist observations)

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use shared::{EnrichmentKind, EnrichmentPayload, FetchError, Observation, ObservationLocation, ObservationResult};
use crate::error::EnrichResult;
use crate::services::providers::http::{build_client, endpoint, non_empty, require_query, send_json};
use crate::traits::UpstreamProvider;
use crate::types::ProviderQuery;

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    results: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    observed_on: Option<String>,
    place_guess: Option<String>,
    /// `"lat,lon"`
    location: Option<String>,
    #[serde(default)]
    photos: Vec<RawPhoto>,
    user: Option<RawUser>,
    quality_grade: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: Option<String>,
    name: Option<String>,
}

pub struct INaturalistObservationProvider {
    client: reqwest::Client,
    base_url: String,
}

impl INaturalistObservationProvider {
    pub fn new(base_url: &str, timeout: Duration) -> EnrichResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }
}

fn parse_coordinates(raw: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some((lat, lon)) = raw.and_then(|r| r.split_once(',')) else {
        return (None, None);
    };
    match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
        (Ok(lat), Ok(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            (Some(lat), Some(lon))
        }
        _ => (None, None),
    }
}

impl RawObservation {
    /// `None` when the sighting has no usable date
    fn into_observation(self) -> Option<Observation> {
        let observed_on = NaiveDate::parse_from_str(self.observed_on.as_deref()?.trim(), "%Y-%m-%d").ok()?;
        let (lat, lon) = parse_coordinates(self.location.as_deref());
        let photo_url = self
            .photos
            .into_iter()
            .find_map(|p| non_empty(p.url))
            .map(|url| url.replace("/square.", "/medium."));
        let observer = self.user.and_then(|u| non_empty(u.login).or(non_empty(u.name)));

        Some(Observation {
            location: ObservationLocation {
                lat,
                lon,
                place_name: non_empty(self.place_guess),
            },
            observed_on,
            photo_url,
            observer,
            quality: non_empty(self.quality_grade).unwrap_or_else(|| "casual".to_string()),
        })
    }
}

#[async_trait]
impl UpstreamProvider for INaturalistObservationProvider {
    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::Observations
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError> {
        let taxon = require_query(query.taxon())?;
        let limit = query.limit.max(1);
        let per_page = limit.to_string();
        let url = endpoint(
            &self.base_url,
            "v1/observations",
            &[
                ("taxon_name", taxon.as_str()),
                ("per_page", per_page.as_str()),
                ("order_by", "observed_on"),
                ("order", "desc"),
            ],
        )?;
        debug!(url = %url, "Fetching observations");

        let response: ObservationsResponse = send_json(self.client.get(url)).await?;
        if response.results.is_empty() {
            return Err(FetchError::NotFound);
        }

        let mut items: Vec<Observation> = response
            .results
            .into_iter()
            .filter_map(RawObservation::into_observation)
            .collect();
        if items.is_empty() {
            return Err(FetchError::NotFound);
        }
        items.sort_by(|a, b| b.observed_on.cmp(&a.observed_on));
        items.truncate(limit as usize);

        Ok(EnrichmentPayload::Observations(ObservationResult { items }))
    }
}
