//! Upstream layer: the EGRUL registry document provider and the
//! classification code search provider, behind source traits so the
//! pipeline can run against fakes.

use async_trait::async_trait;
use innlookup_core::{Inn, SupplementaryCodes};
use serde_json::Value;

mod error;
pub use error::UpstreamError;

#[cfg(feature = "http")]
pub mod codes;
#[cfg(feature = "http")]
pub mod registry;

#[cfg(feature = "http")]
pub use codes::CodeSearchClient;
#[cfg(feature = "http")]
pub use registry::RegistryClient;

/// Default per-request timeout for both upstreams.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Provider of the authoritative legal-entity document.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn fetch_document(&self, inn: &Inn) -> Result<Value, UpstreamError>;
}

/// Provider of supplementary classification codes.
#[async_trait]
pub trait CodesSource: Send + Sync {
    async fn fetch_codes(&self, inn: &Inn) -> Result<SupplementaryCodes, UpstreamError>;
}
