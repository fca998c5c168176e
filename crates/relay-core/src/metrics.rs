use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    successful: u64,
    failed: u64,
    cache_hits: u64,
    total_fee_paid: Decimal,
    average_latency: Duration,
}

impl Counters {
    fn record(&mut self, success: bool, fee: Decimal, latency: Duration) {
        self.total += 1;
        if success {
            self.successful += 1;
            self.total_fee_paid = self.total_fee_paid.saturating_add(fee);
        } else {
            self.failed += 1;
        }
        self.average_latency = self.average_latency.saturating_add(latency) / 2;
    }
}

/// Point-in-time copy of the recorder's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_transactions: u64,
    pub successful_transactions: u64,
    pub failed_transactions: u64,
    pub cache_hits: u64,
    pub total_fee_paid: Decimal,
    #[serde(rename = "average_latency_ms", with = "relay_models::serde_duration")]
    pub average_latency: Duration,
    pub success_rate: f64,
}

impl MetricsSnapshot {
    /// Flat key/value view for printing.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert("total_transactions".to_string(), Value::from(self.total_transactions));
        map.insert(
            "successful_transactions".to_string(),
            Value::from(self.successful_transactions),
        );
        map.insert(
            "failed_transactions".to_string(),
            Value::from(self.failed_transactions),
        );
        map.insert("cache_hits".to_string(), Value::from(self.cache_hits));
        map.insert(
            "total_fee_paid".to_string(),
            Value::from(self.total_fee_paid.to_string()),
        );
        map.insert(
            "average_latency_ms".to_string(),
            Value::from(self.average_latency.as_millis() as u64),
        );
        map.insert("success_rate".to_string(), Value::from(self.success_rate));
        map
    }
}

/// Counters shared by every call through an orchestrator.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    counters: RwLock<Counters>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a terminal outcome. The fee only counts toward the total on success,
    /// which saturates at `Decimal::MAX`.
    ///
    /// The latency average blends each sample with the previous average, so the
    /// first sample after a reset lands at half its value.
    pub fn record_outcome(&self, success: bool, fee: Decimal, latency: Duration) {
        let mut c = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        c.record(success, fee, latency);
    }

    /// Record a call served from the result cache: a success with no fee.
    pub fn record_cache_hit(&self, latency: Duration) {
        let mut c = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        c.cache_hits += 1;
        c.record(true, Decimal::ZERO, latency);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        let success_rate = if c.total == 0 {
            0.0
        } else {
            c.successful as f64 / c.total as f64
        };
        MetricsSnapshot {
            total_transactions: c.total,
            successful_transactions: c.successful,
            failed_transactions: c.failed,
            cache_hits: c.cache_hits,
            total_fee_paid: c.total_fee_paid,
            average_latency: c.average_latency,
            success_rate,
        }
    }

    pub fn reset(&self) {
        let mut c = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        *c = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn empty_recorder_has_zero_success_rate() {
        let snapshot = MetricsRecorder::new().snapshot();
        assert_eq!(snapshot.total_transactions, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.total_fee_paid, Decimal::ZERO);
    }

    #[test]
    fn counts_and_fees() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, dec!(0.05), Duration::from_millis(100));
        metrics.record_outcome(true, dec!(0.03), Duration::from_millis(100));
        metrics.record_outcome(false, dec!(9.99), Duration::from_millis(100));

        let s = metrics.snapshot();
        assert_eq!(s.total_transactions, 3);
        assert_eq!(s.successful_transactions, 2);
        assert_eq!(s.failed_transactions, 1);
        assert_eq!(s.total_fee_paid, dec!(0.08));
        assert!((s.success_rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_average_blends_from_zero() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, dec!(0), Duration::from_millis(100));
        assert_eq!(metrics.snapshot().average_latency, Duration::from_millis(50));

        metrics.record_outcome(true, dec!(0), Duration::from_millis(150));
        assert_eq!(metrics.snapshot().average_latency, Duration::from_millis(100));
    }

    #[test]
    fn reset_zeroes_everything() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, dec!(1), Duration::from_millis(10));
        metrics.record_cache_hit(Duration::from_millis(5));
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsRecorder::new().snapshot());
    }

    #[test]
    fn cache_hit_is_a_free_success() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, dec!(0.05), Duration::from_millis(100));
        metrics.record_cache_hit(Duration::from_millis(100));

        let s = metrics.snapshot();
        assert_eq!(s.total_transactions, 2);
        assert_eq!(s.successful_transactions, 2);
        assert_eq!(s.cache_hits, 1);
        assert_eq!(s.total_fee_paid, dec!(0.05));
        assert_eq!(s.average_latency, Duration::from_millis(75));
    }

    #[test]
    fn fee_total_saturates_instead_of_overflowing() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, Decimal::MAX, Duration::from_millis(1));
        metrics.record_outcome(true, Decimal::MAX, Duration::from_millis(1));

        let s = metrics.snapshot();
        assert_eq!(s.total_fee_paid, Decimal::MAX);
        assert_eq!(s.successful_transactions, 2);
    }

    #[test]
    fn map_keys() {
        let metrics = MetricsRecorder::new();
        metrics.record_outcome(true, dec!(0.03), Duration::from_millis(200));
        metrics.record_cache_hit(Duration::from_millis(100));

        let map = metrics.snapshot().to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "average_latency_ms",
                "cache_hits",
                "failed_transactions",
                "success_rate",
                "successful_transactions",
                "total_fee_paid",
                "total_transactions",
            ]
        );
        assert_eq!(map["total_fee_paid"], Value::from("0.03"));
        assert_eq!(map["average_latency_ms"], Value::from(100u64));
        assert_eq!(map["cache_hits"], Value::from(1u64));
    }

    #[test]
    fn concurrent_recording() {
        let metrics = Arc::new(MetricsRecorder::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record_outcome(true, dec!(0.01), Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let s = metrics.snapshot();
        assert_eq!(s.total_transactions, 800);
        assert_eq!(s.total_fee_paid, dec!(8.00));
        assert_eq!(s.success_rate, 1.0);
    }

    #[test]
    fn snapshots_never_see_half_recorded_cache_hits() {
        let metrics = Arc::new(MetricsRecorder::new());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        metrics.record_cache_hit(Duration::from_millis(1));
                    }
                })
            })
            .collect();

        let reader = {
            let metrics = Arc::clone(&metrics);
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let s = metrics.snapshot();
                    assert_eq!(s.cache_hits, s.total_transactions);
                    assert_eq!(s.successful_transactions, s.total_transactions);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(metrics.snapshot().cache_hits, 2_000);
    }
}
