use std::time::Duration;

use futures::future::join_all;
use innlookup_service::{Enricher, EnricherConfig, LookupError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INN: &str = "7707083893";
const CODES_PATH: &str = "/calculators/api/codeSearch/codes";

fn config(registry: &MockServer, codes: &MockServer) -> EnricherConfig {
    EnricherConfig {
        registry_url: registry.uri(),
        codes_url: codes.uri(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

async fn mount_registry(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{INN}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "СвЮЛ": {
                "@attributes": { "ИНН": INN },
                "СвНаимЮЛ": {
                    "@attributes": { "НаимЮЛПолн": "Example Org" },
                    "СвНаимЮЛСокр": { "@attributes": { "НаимСокр": "Example" } }
                },
                "СвОбрЮЛ": { "@attributes": { "ДатаРег": "2000-01-01" } }
            }
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn example_lookup_merges_both_upstreams() {
    let registry = MockServer::start().await;
    let codes = MockServer::start().await;
    mount_registry(&registry, 1).await;
    Mock::given(method("POST"))
        .and(path(CODES_PATH))
        .and(query_param("inn", INN))
        .and(query_param("type", "okfs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "organizationInfo": { "requisites": [
                { "id": "okpo", "content": "12345678" }
            ] } }
        })))
        .expect(1)
        .mount(&codes)
        .await;

    let enricher = Enricher::from_config(&config(&registry, &codes)).unwrap();
    let record = enricher.fetch_enrichment(INN).await;

    let short = serde_json::to_value(&record).unwrap()["short"].clone();
    assert_eq!(short["НаимЮЛПолн"], "Example Org");
    assert_eq!(short["НаимСокр"], "Example");
    assert_eq!(short["ДатаОбр"], "2000-01-01");
    assert_eq!(short["ОКПО"], "12345678");
    assert_eq!(short["ОКАТО"], "-");
    assert_eq!(short["ОКФС"], "-");
    assert_eq!(short["ОКОГУ"], "-");
    assert_eq!(short["КодРегиона"], "-");

    // Served from cache; the mocks verify one call each on drop.
    let again = enricher.fetch_enrichment(INN).await;
    assert_eq!(again, record);
}

#[tokio::test]
async fn code_search_outage_degrades_gracefully() {
    let registry = MockServer::start().await;
    let codes = MockServer::start().await;
    mount_registry(&registry, 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&codes)
        .await;

    let enricher = Enricher::from_config(&config(&registry, &codes)).unwrap();
    let record = enricher.fetch_enrichment(INN).await;
    let summary = record.summary().expect("degraded record still succeeds");
    assert_eq!(summary.full_name, "Example Org");
    assert_eq!(summary.okpo, "-");
    assert!(enricher.render_metrics().contains(
        "innlookup_upstream_failures_total{upstream=\"secondary\"} 1"
    ));
}

#[tokio::test]
async fn unreachable_registry_yields_error_record() {
    let registry = MockServer::start().await;
    let codes = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&registry)
        .await;

    let enricher = Enricher::from_config(&config(&registry, &codes)).unwrap();
    let record = enricher.fetch_enrichment(INN).await;
    assert!(matches!(
        record.error(),
        Some(LookupError::UpstreamUnavailable { .. })
    ));
    let body = serde_json::to_value(&record).unwrap();
    assert_eq!(body["kind"], "upstream_unavailable");
    assert_eq!(body["short"], json!({}));
    assert!(enricher.cache().is_empty());
}

#[tokio::test]
async fn invalid_inputs_make_no_requests() {
    let registry = MockServer::start().await;
    let codes = MockServer::start().await;

    let enricher = Enricher::from_config(&config(&registry, &codes)).unwrap();
    let records = join_all(["12345", "12345678AB", ""].map(|s| enricher.fetch_enrichment(s))).await;
    for record in &records {
        assert!(matches!(
            record.error(),
            Some(LookupError::InvalidIdentifier(_))
        ));
    }

    assert!(registry.received_requests().await.unwrap().is_empty());
    assert!(codes.received_requests().await.unwrap().is_empty());
    let metrics = enricher.render_metrics();
    assert!(metrics.contains("innlookup_requests_total{outcome=\"invalid_inn\"} 3"));
    assert!(metrics.contains("innlookup_cache_misses_total 0"));
}
