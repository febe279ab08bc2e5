//! Prometheus metrics for the enrichment pipeline.
//!
//! Each [`Metrics`] owns its own [`Registry`], so several pipelines (and
//! tests) never collide on metric names. Metrics are a side channel: nothing
//! here can fail a lookup.

use std::time::Duration;

use innlookup_core::Upstream;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

/// Lookup latency buckets (seconds). Two sequential upstream calls with a
/// 10s timeout each bound a miss at roughly 20s.
const LOOKUP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 20.0,
];

/// Outcome label recorded for every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    InvalidInn,
    Success,
    Error,
    FallbackCache,
}

impl OutcomeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCategory::InvalidInn => "invalid_inn",
            OutcomeCategory::Success => "success",
            OutcomeCategory::Error => "error",
            OutcomeCategory::FallbackCache => "fallback_cache",
        }
    }
}

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    /// Lookups by outcome - labels: outcome
    pub(crate) requests_total: IntCounterVec,

    pub(crate) cache_hits_total: IntCounter,

    pub(crate) cache_misses_total: IntCounter,

    /// Live cache entries after the most recent lookup or sweep
    pub(crate) cache_entries: IntGauge,

    pub(crate) request_duration_seconds: Histogram,

    /// Upstream fetch failures - labels: upstream (primary/secondary)
    pub(crate) upstream_failures_total: IntCounterVec,
}

impl Metrics {
    /// Create all metrics and register them with a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("innlookup_requests_total", "Total INN lookups by outcome"),
            &["outcome"],
        )?;
        let cache_hits_total =
            IntCounter::new("innlookup_cache_hits_total", "Lookups served from cache")?;
        let cache_misses_total = IntCounter::new(
            "innlookup_cache_misses_total",
            "Lookups that had to query the upstreams",
        )?;
        let cache_entries =
            IntGauge::new("innlookup_cache_entries", "Current number of cached records")?;
        let request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "innlookup_request_duration_seconds",
                "INN lookup duration in seconds",
            )
            .buckets(LOOKUP_LATENCY_BUCKETS.to_vec()),
        )?;
        let upstream_failures_total = IntCounterVec::new(
            Opts::new(
                "innlookup_upstream_failures_total",
                "Failed upstream fetches by provider",
            ),
            &["upstream"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(cache_entries.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(upstream_failures_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            cache_hits_total,
            cache_misses_total,
            cache_entries,
            request_duration_seconds,
            upstream_failures_total,
        })
    }

    /// Record a finished lookup.
    pub fn observe(&self, outcome: OutcomeCategory, elapsed: Duration) {
        self.requests_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.request_duration_seconds.observe(elapsed.as_secs_f64());
    }

    pub fn cache_hit(&self) {
        self.cache_hits_total.inc();
    }

    pub fn cache_miss(&self) {
        self.cache_misses_total.inc();
    }

    pub fn set_cache_entries(&self, count: usize) {
        self.cache_entries.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn upstream_failure(&self, upstream: Upstream) {
        self.upstream_failures_total
            .with_label_values(&[upstream.as_str()])
            .inc();
    }

    /// Prometheus text exposition of every metric. Encoding failures are
    /// logged and yield whatever was written so far.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_instances_do_not_collide() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.cache_hit();
        assert_eq!(a.cache_hits_total.get(), 1);
        assert_eq!(b.cache_hits_total.get(), 0);
    }

    #[test]
    fn render_uses_text_exposition_format() {
        let m = Metrics::new().unwrap();
        m.observe(OutcomeCategory::FallbackCache, Duration::from_millis(30));
        m.set_cache_entries(7);
        m.upstream_failure(Upstream::Secondary);

        let text = m.render();
        assert!(text.contains("# TYPE innlookup_requests_total counter"));
        assert!(text.contains("innlookup_requests_total{outcome=\"fallback_cache\"} 1"));
        assert!(text.contains("innlookup_cache_entries 7"));
        assert!(text.contains("innlookup_upstream_failures_total{upstream=\"secondary\"} 1"));
        assert!(text.contains("innlookup_request_duration_seconds_count 1"));
    }
}
