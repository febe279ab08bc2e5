use innlookup_store::StoreError;
use innlookup_sync::UpstreamError;
use thiserror::Error;

/// Failures while assembling an [`Enricher`](crate::Enricher). Lookups
/// themselves never fail; they return error records instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cache setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] UpstreamError),
}
