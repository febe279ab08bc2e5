use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which upstream provider a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    /// EGRUL registry document provider.
    Primary,
    /// Classification code search provider.
    Secondary,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Primary => "primary",
            Upstream::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lookup could not produce a success record.
///
/// Causes are kept as strings so the error can live inside a cached,
/// cloneable record and be compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("invalid INN {0:?}: expected {len} ASCII digits", len = crate::INN_LEN)]
    InvalidIdentifier(String),

    #[error("{upstream} upstream unavailable: {cause}")]
    UpstreamUnavailable { upstream: Upstream, cause: String },

    #[error("unexpected registry document shape: {0}")]
    Extraction(String),
}

impl LookupError {
    pub fn upstream(upstream: Upstream, cause: impl fmt::Display) -> Self {
        LookupError::UpstreamUnavailable {
            upstream,
            cause: cause.to_string(),
        }
    }

    /// Stable machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::InvalidIdentifier(_) => "invalid_identifier",
            LookupError::UpstreamUnavailable { .. } => "upstream_unavailable",
            LookupError::Extraction(_) => "extraction_error",
        }
    }
}
