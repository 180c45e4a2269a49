//! Core types used throughout the enrichment system

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Normalize a free-form name for lookups: trim, collapse inner whitespace, lowercase
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The named entity (animal) being enriched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
}

impl Subject {
    /// Build a validated subject; an all-whitespace name is rejected
    pub fn new(name: impl Into<String>) -> SharedResult<Self> {
        let subject = Self {
            name: name.into(),
            scientific_name: None,
        };
        subject.validate()?;
        Ok(subject)
    }

    pub fn with_scientific_name(mut self, scientific_name: impl Into<String>) -> Self {
        let scientific_name = scientific_name.into();
        self.scientific_name = if scientific_name.trim().is_empty() {
            None
        } else {
            Some(scientific_name)
        };
        self
    }

    pub fn validate(&self) -> SharedResult<()> {
        if self.name.trim().is_empty() {
            return Err(SharedError::EmptyName);
        }
        Ok(())
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Normalized scientific name, `None` when absent or blank
    pub fn normalized_scientific_name(&self) -> Option<String> {
        self.scientific_name
            .as_deref()
            .map(normalize_name)
            .filter(|s| !s.is_empty())
    }
}

/// One of the independent pieces of derived data attached to a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    Image,
    Taxonomy,
    Observations,
    Description,
}

impl EnrichmentKind {
    pub const ALL: [EnrichmentKind; 4] = [
        EnrichmentKind::Image,
        EnrichmentKind::Taxonomy,
        EnrichmentKind::Observations,
        EnrichmentKind::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentKind::Image => "image",
            EnrichmentKind::Taxonomy => "taxonomy",
            EnrichmentKind::Observations => "observations",
            EnrichmentKind::Description => "description",
        }
    }

    /// Parse a comma separated list such as `"image, taxonomy"`, ignoring blanks
    pub fn parse_list(input: &str) -> SharedResult<Vec<EnrichmentKind>> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnrichmentKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" | "images" => Ok(EnrichmentKind::Image),
            "taxonomy" => Ok(EnrichmentKind::Taxonomy),
            "observations" | "observation" => Ok(EnrichmentKind::Observations),
            "description" => Ok(EnrichmentKind::Description),
            _ => Err(SharedError::UnknownKind { input: s.to_string() }),
        }
    }
}

/// Where a field of an enriched response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// This request performed a successful provider fetch
    Fresh,
    /// Served from the cache store without calling the provider
    Cached,
    /// No usable data from either source; a placeholder was substituted
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Fresh => write!(f, "fresh"),
            Provenance::Cached => write!(f, "cached"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// A catalog record held by the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub habitat: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub lifespan: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl StoredRecord {
    /// Subject used to enrich this record
    pub fn subject(&self) -> SharedResult<Subject> {
        let subject = Subject::new(self.name.clone())?;
        Ok(match &self.species {
            Some(species) => subject.with_scientific_name(species.clone()),
            None => subject,
        })
    }
}
