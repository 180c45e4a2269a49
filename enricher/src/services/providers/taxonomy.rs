//! Taxonomic classification adapter (GBIF species match)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use shared::{EnrichmentKind, EnrichmentPayload, FetchError, TaxonomyResult};
use crate::error::EnrichResult;
use crate::services::providers::http::{build_client, endpoint, non_empty, require_query, send_json};
use crate::traits::UpstreamProvider;
use crate::types::ProviderQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeciesMatch {
    match_type: String,
    scientific_name: Option<String>,
    canonical_name: Option<String>,
    kingdom: Option<String>,
    #[serde(rename = "class")]
    class_name: Option<String>,
    order: Option<String>,
    family: Option<String>,
}

pub struct GbifTaxonomyProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GbifTaxonomyProvider {
    pub fn new(base_url: &str, timeout: Duration) -> EnrichResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl UpstreamProvider for GbifTaxonomyProvider {
    fn kind(&self) -> EnrichmentKind {
        EnrichmentKind::Taxonomy
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<EnrichmentPayload, FetchError> {
        let name = require_query(query.taxon())?;
        let url = endpoint(&self.base_url, "v1/species/match", &[("name", name.as_str()), ("verbose", "false")])?;
        debug!(url = %url, "Matching species");

        let matched: SpeciesMatch = send_json(self.client.get(url)).await?;
        if matched.match_type.eq_ignore_ascii_case("NONE") {
            return Err(FetchError::NotFound);
        }

        Ok(EnrichmentPayload::Taxonomy(TaxonomyResult {
            scientific_name: non_empty(matched.canonical_name).or(non_empty(matched.scientific_name)),
            kingdom: non_empty(matched.kingdom),
            class_name: non_empty(matched.class_name),
            order: non_empty(matched.order),
            family: non_empty(matched.family),
        }))
    }
}
