use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use relay_models::transaction::TransactionResult;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CacheError;

/// A stored value with its lifetime. Never handed out; readers get a clone of `value`.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// An entry is dead at its expiration instant, not after it.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

type Store<V> = Arc<RwLock<HashMap<String, CacheEntry<V>>>>;

struct Sweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// TTL memoization store for settled results.
///
/// Expiry is checked on every read, so an expired entry is a miss whether or
/// not the background sweep has removed it yet. The sweep only bounds memory.
///
/// The store sits behind an `RwLock`: reads share the lock, `set`/`delete`
/// and the sweep take it exclusively, so readers see a whole entry or nothing.
pub struct ResultCache<V = TransactionResult> {
    store: Store<V>,
    ttl: Duration,
    ttl_delta: TimeDelta,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<V> ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache without a sweep task. Expired entries are still never returned.
    pub fn new(ttl: Duration) -> Result<Self, CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(
                "TTL must be greater than zero".to_string(),
            ));
        }
        let ttl_delta =
            TimeDelta::from_std(ttl).map_err(|e| CacheError::InvalidTtl(e.to_string()))?;

        Ok(Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            ttl_delta,
            sweeper: Mutex::new(None),
        })
    }

    /// Create a cache and start its sweep task on the current tokio runtime.
    pub fn with_sweeper(ttl: Duration) -> Result<Self, CacheError> {
        let cache = Self::new(ttl)?;
        cache.start_sweeper()?;
        Ok(cache)
    }

    /// Start the periodic sweep (period = TTL). Idempotent.
    pub fn start_sweeper(&self) -> Result<(), CacheError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            CacheError::Unavailable(format!("sweep task needs a tokio runtime: {e}"))
        })?;

        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(sweep_loop(
            Arc::clone(&self.store),
            self.ttl,
            cancel.clone(),
        ));
        *slot = Some(Sweeper { cancel, handle });
        debug!(ttl_ms = self.ttl.as_millis(), "Result cache sweeper started");
        Ok(())
    }

    /// Returns a copy of the live value for `key`, or `None` when absent or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let entry = store.get(key).filter(|entry| !entry.is_expired_at(now))?;
        debug!(
            key,
            age_ms = (now - entry.created_at).num_milliseconds(),
            "Result cache hit"
        );
        Some(entry.value.clone())
    }

    /// Store `value` until now + TTL, replacing any previous entry for `key`.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let now = Utc::now();
        let entry = CacheEntry {
            value,
            created_at: now,
            expires_at: now + self.ttl_delta,
        };
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.insert(key.into(), entry);
    }

    pub fn delete(&self, key: &str) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.remove(key);
    }

    /// Remove every expired entry now. Returns how many were evicted.
    pub fn sweep_expired(&self) -> usize {
        sweep_store(&self.store)
    }

    /// Number of stored entries, including expired ones the sweep has not reached.
    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Stop the sweep task and wait for it to exit.
    pub async fn shutdown(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(sweeper) = sweeper {
            sweeper.cancel.cancel();
            let _ = sweeper.handle.await;
            debug!("Result cache sweeper stopped");
        }
    }
}

impl<V> Drop for ResultCache<V> {
    fn drop(&mut self) {
        let slot = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(sweeper) = slot.take() {
            sweeper.cancel.cancel();
            sweeper.handle.abort();
        }
    }
}

fn sweep_store<V>(store: &RwLock<HashMap<String, CacheEntry<V>>>) -> usize {
    let now = Utc::now();
    let mut store = store.write().unwrap_or_else(PoisonError::into_inner);
    let before = store.len();
    store.retain(|_, entry| !entry.is_expired_at(now));
    before - store.len()
}

/// Periodically evict expired entries until cancelled.
async fn sweep_loop<V>(store: Store<V>, period: Duration, cancel: CancellationToken)
where
    V: Send + Sync + 'static,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Result cache sweep loop shutting down");
                break;
            }
            _ = tokio::time::sleep(period) => {
                let evicted = sweep_store(&store);
                if evicted > 0 {
                    info!(evicted, "Swept expired cache entries");
                }
            }
        }
    }
}
