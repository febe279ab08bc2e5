//! HTTP client for the EGRUL registry mirror (`GET {base}/{inn}.json`).

use std::time::Duration;

use async_trait::async_trait;
use innlookup_core::Inn;
use serde_json::Value;
use tracing::{debug, info};

use crate::{RegistrySource, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://egrul.itsoft.ru";

/// Fetches one registry document per INN. Single attempt, no retries.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `https://egrul.itsoft.ru` (a trailing slash
    /// is trimmed). `timeout` bounds the whole request including the body.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn document_url(&self, inn: &Inn) -> String {
        format!("{}/{}.json", self.base_url, inn)
    }
}

#[async_trait]
impl RegistrySource for RegistryClient {
    async fn fetch_document(&self, inn: &Inn) -> Result<Value, UpstreamError> {
        let url = self.document_url(inn);
        debug!(url = %url, "fetching registry document");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::server(status.as_u16(), &body));
        }

        let doc: Value = resp.json().await?;
        info!(inn = %inn, "fetched registry document");
        Ok(doc)
    }
}
