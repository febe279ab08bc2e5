//! Enrichment pipeline: INN validation, cache lookup, registry and code
//! search fetches, fallback policy, and metrics around every decision.

mod config;
mod error;
pub mod metrics;
mod pipeline;
pub mod policy;

pub use config::EnricherConfig;
pub use error::ServiceError;
pub use metrics::{Metrics, OutcomeCategory};
pub use pipeline::{Enricher, RecordCache};
pub use policy::Outcome;

pub use innlookup_core::{EnrichmentRecord, Inn, LookupError, Summary};
