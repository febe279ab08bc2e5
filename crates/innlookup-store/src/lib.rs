//! Storage layer: capacity-bounded, time-expiring in-memory cache.

mod cache;
mod clock;
mod error;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
