//! The enrichment pipeline.
//!
//! A lookup runs: validate → cache → registry document → extract → code
//! search → merge. [`Enricher::decide`] walks that sequence and stops at the
//! first [`Outcome`] that applies; [`Enricher::settle`] then writes the cache,
//! logs, records metrics, and hands back the record.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use innlookup_core::{EnrichmentRecord, Inn, LookupError, Upstream, extract_summary};
use innlookup_store::TtlCache;
use innlookup_sync::{CodeSearchClient, CodesSource, RegistryClient, RegistrySource};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{EnricherConfig, Metrics, Outcome, ServiceError};

/// Cache of enrichment records keyed by INN.
pub type RecordCache = TtlCache<Inn, EnrichmentRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Serve a live cache entry when there is one.
    Cached,
    /// Skip the cache hit and go to the upstreams; the cache still backs
    /// the fallbacks.
    Refresh,
}

/// Composition root for lookups. Cheap to share behind an [`Arc`].
pub struct Enricher {
    cache: Arc<RecordCache>,
    registry: Arc<dyn RegistrySource>,
    codes: Arc<dyn CodesSource>,
    metrics: Option<Metrics>,
}

impl Enricher {
    pub fn new(
        cache: Arc<RecordCache>,
        registry: Arc<dyn RegistrySource>,
        codes: Arc<dyn CodesSource>,
    ) -> Self {
        let metrics = match Metrics::new() {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = %e, "metrics unavailable, continuing without them");
                None
            }
        };
        Self {
            cache,
            registry,
            codes,
            metrics,
        }
    }

    /// Build an enricher talking to the configured HTTP upstreams.
    pub fn from_config(config: &EnricherConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let cache = RecordCache::new(config.cache_capacity, config.cache_ttl)?;
        let registry = RegistryClient::new(&config.registry_url, config.timeout)?;
        let codes = CodeSearchClient::new(&config.codes_url, config.timeout)?;
        info!(
            registry = %config.registry_url,
            codes = %config.codes_url,
            capacity = config.cache_capacity,
            ttl_secs = config.cache_ttl.as_secs(),
            "enricher configured"
        );
        Ok(Self::new(Arc::new(cache), Arc::new(registry), Arc::new(codes)))
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Prometheus text exposition, or an empty string without metrics.
    pub fn render_metrics(&self) -> String {
        self.metrics.as_ref().map(Metrics::render).unwrap_or_default()
    }

    /// Look up `input`, serving from cache when possible.
    ///
    /// Never fails: problems come back as [`EnrichmentRecord::Failed`].
    pub async fn fetch_enrichment(&self, input: &str) -> EnrichmentRecord {
        self.run(input, Mode::Cached).await
    }

    /// Look up `input` at the upstreams even if it is cached. The cached
    /// entry is still used for the registry and code search fallbacks.
    pub async fn refresh(&self, input: &str) -> EnrichmentRecord {
        self.run(input, Mode::Refresh).await
    }

    async fn run(&self, input: &str, mode: Mode) -> EnrichmentRecord {
        let started = Instant::now();
        let outcome = self.decide(input, mode).await;
        self.settle(outcome, started.elapsed())
    }

    async fn decide(&self, input: &str, mode: Mode) -> Outcome {
        let inn = match Inn::parse(input) {
            Ok(inn) => inn,
            Err(err) => return Outcome::InvalidInput(err),
        };

        if mode == Mode::Cached {
            if let Some(record) = self.cache.get(&inn) {
                self.with_metrics(Metrics::cache_hit);
                return Outcome::CacheHit(record);
            }
            self.with_metrics(Metrics::cache_miss);
        }

        let raw = match self.registry.fetch_document(&inn).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(inn = %inn, error = %e, "registry fetch failed");
                self.with_metrics(|m| m.upstream_failure(Upstream::Primary));
                let cause = LookupError::upstream(Upstream::Primary, e);
                // Re-check: a concurrent lookup may have filled the entry.
                return match self.cache.get(&inn) {
                    Some(cached) => Outcome::StaleServe { cached, cause },
                    None => Outcome::PrimaryFailed(cause),
                };
            }
        };

        let mut summary = match extract_summary(&raw) {
            Ok(summary) => summary,
            Err(err) => return Outcome::ExtractionFailed(err),
        };

        match self.codes.fetch_codes(&inn).await {
            Ok(codes) => {
                summary.overlay_codes(&codes);
                Outcome::Fresh {
                    inn,
                    record: EnrichmentRecord::Found { raw, summary },
                }
            }
            Err(e) => {
                warn!(inn = %inn, error = %e, "code search failed");
                self.with_metrics(|m| m.upstream_failure(Upstream::Secondary));
                let previous = self.cache.get(&inn);
                summary.overlay_previous(previous.as_ref().and_then(EnrichmentRecord::summary));
                Outcome::Degraded {
                    inn,
                    record: EnrichmentRecord::Found { raw, summary },
                    carried_over: previous.is_some(),
                    cause: LookupError::upstream(Upstream::Secondary, e),
                }
            }
        }
    }

    fn settle(&self, outcome: Outcome, elapsed: Duration) -> EnrichmentRecord {
        let category = outcome.category();

        match &outcome {
            Outcome::InvalidInput(err) => debug!(error = %err, "rejected lookup"),
            Outcome::CacheHit(_) => debug!("served from cache"),
            Outcome::StaleServe { cause, .. } => {
                warn!(cause = %cause, "serving cached record after registry failure")
            }
            Outcome::PrimaryFailed(err) => warn!(error = %err, "lookup failed, nothing cached"),
            Outcome::ExtractionFailed(err) => warn!(error = %err, "registry document rejected"),
            Outcome::Degraded {
                inn,
                carried_over,
                cause,
                ..
            } => warn!(
                inn = %inn,
                carried_over,
                cause = %cause,
                "cached record with degraded classification codes"
            ),
            Outcome::Fresh { inn, .. } => info!(inn = %inn, "cached fresh record"),
        }

        if let Some((inn, record)) = outcome.cache_write() {
            self.cache.put(inn.clone(), record.clone());
        }

        self.with_metrics(|m| {
            m.observe(category, elapsed);
            m.set_cache_entries(self.cache.len());
        });

        outcome.into_record()
    }

    fn with_metrics(&self, f: impl FnOnce(&Metrics)) {
        if let Some(m) = &self.metrics {
            f(m);
        }
    }

    /// Spawn a task that purges expired entries every `every` (at least one
    /// second). The task stops once the enricher is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(enricher) = weak.upgrade() else {
                    break;
                };
                let purged = enricher.cache.purge_expired();
                let live = enricher.cache.len();
                enricher.with_metrics(|m| m.set_cache_entries(live));
                debug!(purged, live, "cache sweep");
            }
        })
    }
}
