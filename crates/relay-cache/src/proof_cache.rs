use std::time::Duration;

use moka::future::Cache;
use relay_models::proof::ProofArtifact;
use rust_decimal::Decimal;

/// In-memory cache of generated proofs backed by moka.
///
/// Proofs for the same (amount, required minimum) pair are interchangeable,
/// so a shielded intent can reuse one until it expires.
pub struct ProofCache {
    inner: Cache<String, ProofArtifact>,
}

impl ProofCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    fn key(amount: &Decimal, required_minimum: &Decimal) -> String {
        format!("{}:{}", amount.normalize(), required_minimum.normalize())
    }

    pub async fn get(&self, amount: &Decimal, required_minimum: &Decimal) -> Option<ProofArtifact> {
        self.inner.get(&Self::key(amount, required_minimum)).await
    }

    pub async fn insert(&self, amount: &Decimal, required_minimum: &Decimal, proof: ProofArtifact) {
        self.inner
            .insert(Self::key(amount, required_minimum), proof)
            .await;
    }

    pub async fn invalidate(&self, amount: &Decimal, required_minimum: &Decimal) {
        self.inner
            .invalidate(&Self::key(amount, required_minimum))
            .await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn proof() -> ProofArtifact {
        ProofArtifact::new(vec![1, 2, 3, 4])
    }

    #[tokio::test]
    async fn insert_and_get() {
        let cache = ProofCache::new(100, Duration::from_secs(60));
        cache.insert(&dec!(5000.00), &dec!(0), proof()).await;

        assert_eq!(cache.get(&dec!(5000.00), &dec!(0)).await, Some(proof()));
    }

    #[tokio::test]
    async fn equal_amounts_share_a_proof() {
        let cache = ProofCache::new(100, Duration::from_secs(60));
        cache.insert(&dec!(5000.00), &dec!(0), proof()).await;

        assert!(cache.get(&dec!(5000), &dec!(0.0)).await.is_some());
        assert!(cache.get(&dec!(5000), &dec!(1)).await.is_none());
    }

    #[tokio::test]
    async fn invalidate() {
        let cache = ProofCache::new(100, Duration::from_secs(60));
        cache.insert(&dec!(1), &dec!(0), proof()).await;
        cache.invalidate(&dec!(1), &dec!(0)).await;

        assert_eq!(cache.get(&dec!(1), &dec!(0)).await, None);
    }

    #[tokio::test]
    async fn ttl_expiration() {
        let cache = ProofCache::new(100, Duration::from_millis(50));
        cache.insert(&dec!(1), &dec!(0), proof()).await;

        assert!(cache.get(&dec!(1), &dec!(0)).await.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(&dec!(1), &dec!(0)).await.is_none());
    }
}
