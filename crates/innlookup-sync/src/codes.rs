//! HTTP client for the classification code search
//! (`POST {base}/calculators/api/codeSearch/codes?inn=..&type=okfs`).
//!
//! The response lists organisation requisites as `{id, content}` items under
//! `data.organizationInfo.requisites`. Only the four supplementary code kinds
//! are kept.

use std::time::Duration;

use async_trait::async_trait;
use innlookup_core::{Inn, SupplementaryCodes};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{CodesSource, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://services.kontur.ru";

const CODES_PATH: &str = "/calculators/api/codeSearch/codes";
/// Query discriminator the search endpoint expects alongside the INN.
const QUERY_TYPE: &str = "okfs";

#[derive(Deserialize)]
struct CodeSearchResponse {
    #[serde(default)]
    data: Option<CodeSearchData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeSearchData {
    #[serde(default)]
    organization_info: Option<OrganizationInfo>,
}

#[derive(Deserialize)]
struct OrganizationInfo {
    /// Kept untyped: items of kinds we do not read may have any shape.
    #[serde(default)]
    requisites: Vec<Value>,
}

impl CodeSearchResponse {
    fn into_codes(self) -> SupplementaryCodes {
        let requisites = self
            .data
            .and_then(|d| d.organization_info)
            .map(|o| o.requisites)
            .unwrap_or_default();
        SupplementaryCodes::from_requisites(&requisites)
    }
}

/// Fetches supplementary codes per INN. Single attempt, no retries.
pub struct CodeSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl CodeSearchClient {
    /// Create a client for the given base URL, e.g. `https://services.kontur.ru`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn codes_url(&self) -> String {
        format!("{}{}", self.base_url, CODES_PATH)
    }
}

#[async_trait]
impl CodesSource for CodeSearchClient {
    async fn fetch_codes(&self, inn: &Inn) -> Result<SupplementaryCodes, UpstreamError> {
        let url = self.codes_url();
        debug!(url = %url, inn = %inn, "searching classification codes");

        let resp = self
            .client
            .post(&url)
            .query(&[("inn", inn.as_str()), ("type", QUERY_TYPE)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::server(status.as_u16(), &body));
        }

        let parsed: CodeSearchResponse = resp.json().await?;
        let codes = parsed.into_codes();
        info!(inn = %inn, found = codes.len(), "fetched classification codes");
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innlookup_core::CodeKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn inn() -> Inn {
        Inn::parse("7707083893").unwrap()
    }

    fn parse(body: serde_json::Value) -> SupplementaryCodes {
        serde_json::from_value::<CodeSearchResponse>(body)
            .unwrap()
            .into_codes()
    }

    #[test]
    fn selects_recognised_requisites() {
        let codes = parse(json!({
            "data": { "organizationInfo": { "requisites": [
                { "id": "okpo", "content": "00032537" },
                { "id": "okato", "content": "45293554000" },
                { "id": "okfs", "content": "41" },
                { "id": "okogu", "content": "1500010" },
                { "id": "oktmo", "content": "45397000000" }
            ] } }
        }));
        assert_eq!(codes.len(), 4);
        assert_eq!(codes.get(CodeKind::Okpo), Some("00032537"));
        assert_eq!(codes.get(CodeKind::Okogu), Some("1500010"));
    }

    #[test]
    fn missing_containers_mean_no_codes() {
        assert!(parse(json!({})).is_empty());
        assert!(parse(json!({ "data": null })).is_empty());
        assert!(parse(json!({ "data": { "organizationInfo": {} } })).is_empty());
    }

    #[test]
    fn unrecognised_item_of_any_shape_is_ignored() {
        let codes = parse(json!({
            "data": { "organizationInfo": { "requisites": [
                { "id": "okpo", "content": "12345678" },
                { "id": "oktmo", "content": { "code": "45397000000" } }
            ] } }
        }));
        assert_eq!(codes.get(CodeKind::Okpo), Some("12345678"));
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn numeric_okpo_kept_as_text() {
        let codes = parse(json!({
            "data": { "organizationInfo": { "requisites": [
                { "id": "okpo", "content": 12345678 },
                { "id": "okfs", "content": 41 }
            ] } }
        }));
        assert_eq!(codes.get(CodeKind::Okpo), Some("12345678"));
        assert_eq!(codes.get(CodeKind::Okfs), Some("41"));
    }

    #[test]
    fn requisite_without_content_is_sentinel() {
        let codes = parse(json!({
            "data": { "organizationInfo": { "requisites": [ { "id": "okfs" }, { "content": "x" } ] } }
        }));
        assert_eq!(codes.get(CodeKind::Okfs), Some("-"));
        assert_eq!(codes.len(), 1);
    }

    #[tokio::test]
    async fn posts_inn_and_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CODES_PATH))
            .and(query_param("inn", "7707083893"))
            .and(query_param("type", "okfs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organizationInfo": { "requisites": [ { "id": "okpo", "content": "12345678" } ] } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CodeSearchClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let codes = client.fetch_codes(&inn()).await.unwrap();
        assert_eq!(codes.get(CodeKind::Okpo), Some("12345678"));
        assert_eq!(codes.get(CodeKind::Okato), None);
    }

    #[tokio::test]
    async fn odd_unrecognised_item_does_not_fail_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CODES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organizationInfo": { "requisites": [
                    { "id": "okpo", "content": 12345678 },
                    { "id": "oktmo", "content": { "code": "45397000000" } },
                    { "id": "okato", "content": "45293554000" }
                ] } }
            })))
            .mount(&server)
            .await;

        let client = CodeSearchClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let codes = client.fetch_codes(&inn()).await.unwrap();
        assert_eq!(codes.get(CodeKind::Okpo), Some("12345678"));
        assert_eq!(codes.get(CodeKind::Okato), Some("45293554000"));
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = CodeSearchClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.fetch_codes(&inn()).await.unwrap_err();
        assert_eq!(err.to_string(), "server returned 503: overloaded");
    }

    #[tokio::test]
    async fn wrong_shape_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "organizationInfo": { "requisites": "none" } } })),
            )
            .mount(&server)
            .await;

        let client = CodeSearchClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        assert!(client.fetch_codes(&inn()).await.is_err());
    }
}
