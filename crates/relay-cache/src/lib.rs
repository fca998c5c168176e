pub mod error;
pub mod key;
pub mod proof_cache;
pub mod result_cache;

pub use error::CacheError;
pub use key::CacheKey;
pub use proof_cache::ProofCache;
pub use result_cache::ResultCache;
