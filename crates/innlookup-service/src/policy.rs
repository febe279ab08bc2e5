//! Fallback policy: one [`Outcome`] variant per way a lookup can end.
//!
//! The pipeline decides which variant applies; [`Outcome::category`] and
//! [`Outcome::cache_write`] say how it is counted and whether it is cached.
//!
//! | Variant | Condition | Cached |
//! |---|---|---|
//! | `InvalidInput` | INN is not ten ASCII digits | no |
//! | `CacheHit` | live cache entry | no (already there) |
//! | `StaleServe` | registry failed, cache entry exists | no |
//! | `PrimaryFailed` | registry failed, no cache entry | no |
//! | `ExtractionFailed` | registry document has an unexpected shape | no |
//! | `Degraded` | code search failed; codes carried over or `-` | yes |
//! | `Fresh` | both upstreams succeeded | yes |

use innlookup_core::{EnrichmentRecord, Inn, LookupError};

use crate::OutcomeCategory;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    InvalidInput(LookupError),
    CacheHit(EnrichmentRecord),
    StaleServe {
        cached: EnrichmentRecord,
        cause: LookupError,
    },
    PrimaryFailed(LookupError),
    ExtractionFailed(LookupError),
    Degraded {
        inn: Inn,
        record: EnrichmentRecord,
        /// Codes were copied from an earlier cached summary.
        carried_over: bool,
        cause: LookupError,
    },
    Fresh {
        inn: Inn,
        record: EnrichmentRecord,
    },
}

impl Outcome {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            Outcome::InvalidInput(_) => OutcomeCategory::InvalidInn,
            Outcome::CacheHit(_) | Outcome::Fresh { .. } => OutcomeCategory::Success,
            Outcome::Degraded { carried_over, .. } => {
                if *carried_over {
                    OutcomeCategory::FallbackCache
                } else {
                    OutcomeCategory::Success
                }
            }
            Outcome::StaleServe { .. } => OutcomeCategory::FallbackCache,
            Outcome::PrimaryFailed(_) | Outcome::ExtractionFailed(_) => OutcomeCategory::Error,
        }
    }

    /// The entry this outcome writes to the cache, if any.
    pub fn cache_write(&self) -> Option<(&Inn, &EnrichmentRecord)> {
        match self {
            Outcome::Degraded { inn, record, .. } | Outcome::Fresh { inn, record } => {
                Some((inn, record))
            }
            _ => None,
        }
    }

    /// The record returned to the caller.
    pub fn into_record(self) -> EnrichmentRecord {
        match self {
            Outcome::CacheHit(record)
            | Outcome::StaleServe { cached: record, .. }
            | Outcome::Degraded { record, .. }
            | Outcome::Fresh { record, .. } => record,
            Outcome::InvalidInput(err)
            | Outcome::PrimaryFailed(err)
            | Outcome::ExtractionFailed(err) => EnrichmentRecord::Failed(err),
        }
    }
}
