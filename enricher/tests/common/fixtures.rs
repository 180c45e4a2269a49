//! Test fixtures and sample data

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shared::{
    DescriptionResult, EnrichmentKind, EnrichmentPayload, ImageResult, Observation, ObservationLocation,
    ObservationResult, Subject, TaxonomyResult,
};

pub struct TestFixtures;

impl TestFixtures {
    pub const LION: &'static str = "African Lion";
    pub const LION_SCIENTIFIC: &'static str = "Panthera leo";
    pub const UNKNOWN: &'static str = "Unknown Creature";

    pub fn lion() -> Subject {
        Subject::new(Self::LION).unwrap().with_scientific_name(Self::LION_SCIENTIFIC)
    }

    pub fn unknown_creature() -> Subject {
        Subject::new(Self::UNKNOWN).unwrap()
    }

    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub fn image() -> EnrichmentPayload {
        EnrichmentPayload::Image(ImageResult {
            url: "https://images.test/lion.jpg".to_string(),
            placeholder: false,
        })
    }

    pub fn taxonomy() -> EnrichmentPayload {
        EnrichmentPayload::Taxonomy(TaxonomyResult {
            scientific_name: Some("Panthera leo".to_string()),
            kingdom: Some("Animalia".to_string()),
            class_name: Some("Mammalia".to_string()),
            order: Some("Carnivora".to_string()),
            family: Some("Felidae".to_string()),
        })
    }

    pub fn observations() -> EnrichmentPayload {
        EnrichmentPayload::Observations(ObservationResult {
            items: vec![Observation {
                location: ObservationLocation {
                    lat: Some(-2.33),
                    lon: Some(34.83),
                    place_name: Some("Serengeti, Tanzania".to_string()),
                },
                observed_on: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                photo_url: None,
                observer: Some("ranger_ann".to_string()),
                quality: "research".to_string(),
            }],
        })
    }

    pub fn description() -> EnrichmentPayload {
        EnrichmentPayload::Description(DescriptionResult::generated(
            "The African lion is a large cat.\n\n**Physical Characteristics**\nTawny.",
        ))
    }

    /// A well-formed payload for `kind`
    pub fn payload(kind: EnrichmentKind) -> EnrichmentPayload {
        match kind {
            EnrichmentKind::Image => Self::image(),
            EnrichmentKind::Taxonomy => Self::taxonomy(),
            EnrichmentKind::Observations => Self::observations(),
            EnrichmentKind::Description => Self::description(),
        }
    }
}
