//! Upstream provider adapters, one per enrichment kind

pub mod http;
pub mod image;
pub mod observations;
pub mod taxonomy;
pub mod text;

pub use http::sanitize_query;
pub use image::UnsplashImageProvider;
pub use observations::INaturalistObservationProvider;
pub use taxonomy::GbifTaxonomyProvider;
pub use text::{OpenAiTextProvider, REQUIRED_SECTIONS};

use std::sync::Arc;

use tracing::warn;

use shared::EnrichmentKind;
use crate::config::EnricherConfig;
use crate::error::EnrichResult;
use crate::traits::UpstreamProvider;

/// Build every HTTP adapter that has the credentials it needs
///
/// Kinds left without an adapter still enrich: they resolve to stale cache
/// data or their fallback.
pub fn http_providers(config: &EnricherConfig) -> EnrichResult<Vec<Arc<dyn UpstreamProvider>>> {
    let endpoints = &config.endpoints;
    let mut providers: Vec<Arc<dyn UpstreamProvider>> = Vec::new();

    match &endpoints.unsplash_access_key {
        Some(key) => providers.push(Arc::new(UnsplashImageProvider::new(
            &endpoints.image_base,
            key,
            config.settings_for(EnrichmentKind::Image).timeout,
        )?)),
        None => warn!("UNSPLASH_ACCESS_KEY not set; images will use the placeholder"),
    }

    providers.push(Arc::new(GbifTaxonomyProvider::new(
        &endpoints.taxonomy_base,
        config.settings_for(EnrichmentKind::Taxonomy).timeout,
    )?));

    providers.push(Arc::new(INaturalistObservationProvider::new(
        &endpoints.observation_base,
        config.settings_for(EnrichmentKind::Observations).timeout,
    )?));

    match &endpoints.openai_api_key {
        Some(key) => providers.push(Arc::new(OpenAiTextProvider::new(
            &endpoints.text_base,
            key,
            &endpoints.text_model,
            config.settings_for(EnrichmentKind::Description).timeout,
        )?)),
        None => warn!("OPENAI_API_KEY not set; descriptions will be unavailable"),
    }

    Ok(providers)
}
