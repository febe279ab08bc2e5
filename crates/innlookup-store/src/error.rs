use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,

    #[error("cache TTL must be non-zero, got {0:?}")]
    InvalidTtl(std::time::Duration),
}
