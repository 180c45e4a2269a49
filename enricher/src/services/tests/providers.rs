//! Tests for the HTTP provider adapters against local mock servers

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared::{EnrichmentKind, EnrichmentPayload, FetchError};
use crate::config::{EnricherConfig, ProviderEndpoints};
use crate::services::providers::{
    http_providers, GbifTaxonomyProvider, INaturalistObservationProvider, OpenAiTextProvider,
    UnsplashImageProvider, REQUIRED_SECTIONS,
};
use crate::traits::UpstreamProvider;
use crate::types::ProviderQuery;

const TIMEOUT: Duration = Duration::from_secs(2);

fn lion_query() -> ProviderQuery {
    ProviderQuery {
        name: "African Lion".to_string(),
        scientific_name: Some("Panthera leo".to_string()),
        limit: 3,
    }
}

fn description_text() -> String {
    let mut text = String::from("The African lion is the largest cat in Africa.\n\n");
    for title in REQUIRED_SECTIONS {
        text.push_str(&format!("**{title}**\nDetails about the lion.\n\n"));
    }
    text
}

fn completion(content: &str) -> serde_json::Value {
    json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
}

#[tokio::test]
async fn test_image_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "African Lion"))
        .and(query_param("per_page", "1"))
        .and(header("Authorization", "Client-ID test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "results": [ { "urls": { "regular": "https://images.test/lion.jpg" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = UnsplashImageProvider::new(&server.uri(), "test-key", TIMEOUT).unwrap();
    let payload = provider.fetch(&lion_query()).await.unwrap();

    match payload {
        EnrichmentPayload::Image(image) => {
            assert_eq!(image.url, "https://images.test/lion.jpg");
            assert!(!image.placeholder);
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn test_image_search_without_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "results": [] })))
        .mount(&server)
        .await;

    let provider = UnsplashImageProvider::new(&server.uri(), "test-key", TIMEOUT).unwrap();
    assert_eq!(provider.fetch(&lion_query()).await, Err(FetchError::NotFound));
}

#[tokio::test]
async fn test_taxonomy_match_uses_scientific_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/species/match"))
        .and(query_param("name", "Panthera leo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matchType": "EXACT",
            "scientificName": "Panthera leo (Linnaeus, 1758)",
            "canonicalName": "Panthera leo",
            "kingdom": "Animalia",
            "class": "Mammalia",
            "order": "Carnivora",
            "family": "Felidae"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GbifTaxonomyProvider::new(&server.uri(), TIMEOUT).unwrap();
    match provider.fetch(&lion_query()).await.unwrap() {
        EnrichmentPayload::Taxonomy(taxonomy) => {
            assert_eq!(taxonomy.scientific_name.as_deref(), Some("Panthera leo"));
            assert_eq!(taxonomy.kingdom.as_deref(), Some("Animalia"));
            assert_eq!(taxonomy.class_name.as_deref(), Some("Mammalia"));
            assert_eq!(taxonomy.order.as_deref(), Some("Carnivora"));
            assert_eq!(taxonomy.family.as_deref(), Some("Felidae"));
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn test_taxonomy_without_match_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/species/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matchType": "NONE", "confidence": 100 })))
        .mount(&server)
        .await;

    let provider = GbifTaxonomyProvider::new(&server.uri(), TIMEOUT).unwrap();
    let query = ProviderQuery {
        name: "Unknown Creature".to_string(),
        scientific_name: None,
        limit: 3,
    };
    assert_eq!(provider.fetch(&query).await, Err(FetchError::NotFound));
}

#[tokio::test]
async fn test_observations_are_parsed_and_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/observations"))
        .and(query_param("taxon_name", "Panthera leo"))
        .and(query_param("per_page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 4,
            "results": [
                {
                    "observed_on": "2024-05-02",
                    "place_guess": "Serengeti, Tanzania",
                    "location": "-2.33,34.83",
                    "photos": [ { "url": "https://static.test/photos/1/square.jpg" } ],
                    "user": { "login": "ranger_ann" },
                    "quality_grade": "research"
                },
                {
                    "observed_on": "2024-05-20",
                    "place_guess": "Maasai Mara",
                    "location": "-1.49,35.14",
                    "photos": [],
                    "user": { "login": null, "name": "Sam" },
                    "quality_grade": "needs_id"
                },
                { "observed_on": null, "place_guess": "Somewhere" },
                { "observed_on": "2023-01-01", "quality_grade": "casual" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = INaturalistObservationProvider::new(&server.uri(), TIMEOUT).unwrap();
    match provider.fetch(&lion_query()).await.unwrap() {
        EnrichmentPayload::Observations(observations) => {
            let items = observations.items;
            assert_eq!(items.len(), 3);
            assert_eq!(items[0].observed_on.to_string(), "2024-05-20");
            assert_eq!(items[0].observer.as_deref(), Some("Sam"));
            assert_eq!(items[1].location.lat, Some(-2.33));
            assert_eq!(items[1].location.place_name.as_deref(), Some("Serengeti, Tanzania"));
            assert_eq!(
                items[1].photo_url.as_deref(),
                Some("https://static.test/photos/1/medium.jpg")
            );
            assert_eq!(items[1].quality, "research");
            assert_eq!(items[2].location.lat, None);
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn test_observations_without_dates_are_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/observations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_results": 2,
            "results": [
                { "observed_on": null, "place_guess": "Serengeti, Tanzania" },
                { "observed_on": "sometime in May", "quality_grade": "casual" }
            ]
        })))
        .mount(&server)
        .await;

    let provider = INaturalistObservationProvider::new(&server.uri(), TIMEOUT).unwrap();
    assert_eq!(provider.fetch(&lion_query()).await, Err(FetchError::NotFound));
}

#[tokio::test]
async fn test_description_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&description_text())))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiTextProvider::new(&server.uri(), "sk-test", "test-model", TIMEOUT).unwrap();
    match provider.fetch(&lion_query()).await.unwrap() {
        EnrichmentPayload::Description(description) => {
            assert!(description.generated);
            assert!(description.text.starts_with("The African lion"));
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn test_unstructured_description_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Lions are big cats.")))
        .mount(&server)
        .await;

    let provider = OpenAiTextProvider::new(&server.uri(), "sk-test", "test-model", TIMEOUT).unwrap();
    assert!(matches!(
        provider.fetch(&lion_query()).await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_status_codes_map_to_failures() {
    let cases = [
        (404, FetchError::NotFound),
        (429, FetchError::RateLimited),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let provider = GbifTaxonomyProvider::new(&server.uri(), TIMEOUT).unwrap();
        assert_eq!(provider.fetch(&lion_query()).await, Err(expected));
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let provider = GbifTaxonomyProvider::new(&server.uri(), TIMEOUT).unwrap();
    assert!(matches!(
        provider.fetch(&lion_query()).await,
        Err(FetchError::Unreachable(_))
    ));
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = INaturalistObservationProvider::new(&server.uri(), TIMEOUT).unwrap();
    assert!(matches!(
        provider.fetch(&lion_query()).await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let provider = UnsplashImageProvider::new(&server.uri(), "test-key", Duration::from_millis(100)).unwrap();
    assert_eq!(provider.fetch(&lion_query()).await, Err(FetchError::Timeout));
}

#[tokio::test]
async fn test_unreachable_host() {
    let provider = GbifTaxonomyProvider::new("http://127.0.0.1:1", TIMEOUT).unwrap();
    assert!(matches!(
        provider.fetch(&lion_query()).await,
        Err(FetchError::Unreachable(_))
    ));
}

#[test]
fn test_providers_without_credentials_are_skipped() {
    let config = EnricherConfig::default();
    let kinds: Vec<EnrichmentKind> = http_providers(&config).unwrap().iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![EnrichmentKind::Taxonomy, EnrichmentKind::Observations]);

    let config = EnricherConfig {
        endpoints: ProviderEndpoints {
            unsplash_access_key: Some("key".to_string()),
            openai_api_key: Some("sk".to_string()),
            ..ProviderEndpoints::default()
        },
        ..EnricherConfig::default()
    };
    assert_eq!(http_providers(&config).unwrap().len(), 4);
}
