use std::time::Duration;

use innlookup_sync::{DEFAULT_TIMEOUT, codes, registry};

use crate::ServiceError;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Settings for building an [`Enricher`](crate::Enricher) against the real upstreams.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// Base URL of the EGRUL registry mirror.
    pub registry_url: String,
    /// Base URL of the classification code search service.
    pub codes_url: String,
    /// Per-request timeout, applied to each upstream separately.
    pub timeout: Duration,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    /// How often expired cache entries are swept.
    pub sweep_interval: Duration,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            registry_url: registry::DEFAULT_BASE_URL.to_string(),
            codes_url: codes::DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl EnricherConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.timeout.is_zero() {
            return Err(ServiceError::Config("timeout must be non-zero".into()));
        }
        if self.sweep_interval.is_zero() {
            return Err(ServiceError::Config("sweep interval must be non-zero".into()));
        }
        for (name, url) in [("registry", &self.registry_url), ("codes", &self.codes_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ServiceError::Config(format!(
                    "{name} URL must be http(s), got {url:?}"
                )));
            }
        }
        Ok(())
    }
}
