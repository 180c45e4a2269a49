//! Enrichment payload variants and the merged response returned to callers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::types::{EnrichmentKind, Provenance, Subject};

/// Marker rendered in place of an absent taxonomy rank
pub const UNKNOWN: &str = "Unknown";

fn serialize_or_unknown<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(UNKNOWN))
}

fn deserialize_unknown_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case(UNKNOWN)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    /// Set when `url` is the configured placeholder rather than a provider result
    #[serde(default)]
    pub placeholder: bool,
}

/// Taxonomic ranks of a subject; every absent rank renders as `"Unknown"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyResult {
    #[serde(default, serialize_with = "serialize_or_unknown", deserialize_with = "deserialize_unknown_as_none")]
    pub scientific_name: Option<String>,
    #[serde(default, serialize_with = "serialize_or_unknown", deserialize_with = "deserialize_unknown_as_none")]
    pub kingdom: Option<String>,
    #[serde(rename = "class", default, serialize_with = "serialize_or_unknown", deserialize_with = "deserialize_unknown_as_none")]
    pub class_name: Option<String>,
    #[serde(default, serialize_with = "serialize_or_unknown", deserialize_with = "deserialize_unknown_as_none")]
    pub order: Option<String>,
    #[serde(default, serialize_with = "serialize_or_unknown", deserialize_with = "deserialize_unknown_as_none")]
    pub family: Option<String>,
}

impl TaxonomyResult {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.scientific_name.is_none()
            && self.kingdom.is_none()
            && self.class_name.is_none()
            && self.order.is_none()
            && self.family.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub place_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub location: ObservationLocation,
    pub observed_on: NaiveDate,
    pub photo_url: Option<String>,
    pub observer: Option<String>,
    pub quality: String,
}

/// Recent sightings, most recent first; empty when nothing is known
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationResult {
    #[serde(default)]
    pub items: Vec<Observation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionResult {
    pub text: String,
    /// True for provider-generated prose, false for the "unavailable" sentinel
    pub generated: bool,
}

impl DescriptionResult {
    pub fn generated(text: impl Into<String>) -> Self {
        Self { text: text.into(), generated: true }
    }

    pub fn unavailable(text: impl Into<String>) -> Self {
        Self { text: text.into(), generated: false }
    }
}

/// Derived data for one enrichment kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichmentPayload {
    Image(ImageResult),
    Taxonomy(TaxonomyResult),
    Observations(ObservationResult),
    Description(DescriptionResult),
}

impl EnrichmentPayload {
    pub fn kind(&self) -> EnrichmentKind {
        match self {
            EnrichmentPayload::Image(_) => EnrichmentKind::Image,
            EnrichmentPayload::Taxonomy(_) => EnrichmentKind::Taxonomy,
            EnrichmentPayload::Observations(_) => EnrichmentKind::Observations,
            EnrichmentPayload::Description(_) => EnrichmentKind::Description,
        }
    }
}

/// One payload together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub source: Provenance,
    /// When the underlying data was fetched; absent for fallbacks
    pub fetched_at: Option<DateTime<Utc>>,
    pub data: EnrichmentPayload,
}

/// Merged per-request response: the subject plus one entry per requested kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSubject {
    pub subject: Subject,
    pub enrichments: BTreeMap<EnrichmentKind, Enrichment>,
}

impl EnrichedSubject {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            enrichments: BTreeMap::new(),
        }
    }

    pub fn get(&self, kind: EnrichmentKind) -> Option<&Enrichment> {
        self.enrichments.get(&kind)
    }

    pub fn source(&self, kind: EnrichmentKind) -> Option<Provenance> {
        self.get(kind).map(|e| e.source)
    }

    pub fn image(&self) -> Option<&ImageResult> {
        match self.get(EnrichmentKind::Image).map(|e| &e.data) {
            Some(EnrichmentPayload::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn taxonomy(&self) -> Option<&TaxonomyResult> {
        match self.get(EnrichmentKind::Taxonomy).map(|e| &e.data) {
            Some(EnrichmentPayload::Taxonomy(taxonomy)) => Some(taxonomy),
            _ => None,
        }
    }

    pub fn observations(&self) -> Option<&ObservationResult> {
        match self.get(EnrichmentKind::Observations).map(|e| &e.data) {
            Some(EnrichmentPayload::Observations(observations)) => Some(observations),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&DescriptionResult> {
        match self.get(EnrichmentKind::Description).map(|e| &e.data) {
            Some(EnrichmentPayload::Description(description)) => Some(description),
            _ => None,
        }
    }
}
