use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache TTL: {0}")]
    InvalidTtl(String),

    #[error("Cache not available: {0}")]
    Unavailable(String),
}
