//! Last good rate map, its fetch time and its persistence.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use converter_types::{CachedRates, KeyValueStore, RateMap, RateOrigin, StoreError};
use tracing::{debug, warn};

/// Owns the [`CachedRates`] snapshot.
///
/// Reads are synchronous so the conversion path never waits on I/O. Writes
/// replace rates and timestamp together.
pub struct RateCache<S: KeyValueStore> {
    store: Arc<S>,
    key: String,
    ttl_ms: i64,
    current: RwLock<Option<CachedRates>>,
}

impl<S: KeyValueStore> RateCache<S> {
    pub fn new(store: Arc<S>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            current: RwLock::new(None),
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// True when there is no entry or it is at least one TTL old.
    pub fn is_stale(&self, now: i64) -> bool {
        self.with_current(|cached| cached.is_stale(now, self.ttl_ms))
            .unwrap_or(true)
    }

    pub fn read(&self) -> Option<CachedRates> {
        self.with_current(Clone::clone)
    }

    /// Runs `f` against the current snapshot without cloning it.
    pub fn with_current<R>(&self, f: impl FnOnce(&CachedRates) -> R) -> Option<R> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(f)
    }

    /// Replaces the snapshot in memory. Call [`RateCache::persist`] to save it.
    pub fn write(&self, rates: RateMap, origin: RateOrigin, now: i64) -> CachedRates {
        let cached = CachedRates::new(rates, now, origin);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(cached.clone());
        cached
    }

    /// Loads the persisted snapshot, replacing whatever is in memory.
    ///
    /// Malformed data is logged and treated as absent.
    pub async fn load(&self) -> Result<Option<CachedRates>, StoreError> {
        let loaded = match self.store.get(&self.key).await? {
            Some(value) => match serde_json::from_value::<CachedRates>(value) {
                Ok(cached) => Some(cached),
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding malformed cached rates");
                    None
                }
            },
            None => None,
        };

        debug!(key = %self.key, found = loaded.is_some(), "Loaded cached rates");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = loaded.clone();
        Ok(loaded)
    }

    /// Saves the current snapshot. No-op when the cache is empty.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let Some(cached) = self.read() else {
            return Ok(());
        };
        let value = serde_json::to_value(&cached)?;
        self.store.set(&self.key, value).await
    }

    /// Drops the snapshot from memory and storage.
    pub async fn reset(&self) -> Result<(), StoreError> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.remove(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converter_store::MemoryStore;
    use converter_types::CurrencyCode;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(3600);

    fn cache() -> (Arc<MemoryStore>, RateCache<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = RateCache::new(store.clone(), "test.rates", TTL);
        (store, cache)
    }

    fn eur(rate: f64) -> RateMap {
        RateMap::normalize(CurrencyCode::USD, [("EUR", rate)]).unwrap()
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let (_, cache) = cache();
        assert!(cache.read().is_none());
        assert!(cache.is_stale(0));
    }

    #[test]
    fn test_staleness_boundary() {
        let (_, cache) = cache();
        cache.write(eur(0.85), RateOrigin::live("p"), 1_000);

        assert!(!cache.is_stale(1_000 + 3_599_999));
        assert!(cache.is_stale(1_000 + 3_600_000));
    }

    #[test]
    fn test_write_replaces_rates_and_timestamp_together() {
        let (_, cache) = cache();
        cache.write(eur(0.85), RateOrigin::live("a"), 10);
        cache.write(eur(0.90), RateOrigin::Offline, 20);

        let current = cache.read().unwrap();
        assert_eq!(current.fetched_at, 20);
        assert_eq!(current.rates.get(CurrencyCode::EUR), Some(0.90));
        assert_eq!(current.origin, RateOrigin::Offline);
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let (store, cache) = cache();
        cache.write(eur(0.85), RateOrigin::live("open-er-api"), 42);
        cache.persist().await.unwrap();

        let reloaded = RateCache::new(store, "test.rates", TTL);
        let loaded = reloaded.load().await.unwrap().unwrap();
        assert_eq!(loaded.fetched_at, 42);
        assert_eq!(loaded.origin, RateOrigin::live("open-er-api"));
        assert_eq!(reloaded.read(), Some(loaded));
    }

    #[tokio::test]
    async fn test_malformed_data_is_ignored() {
        let (store, cache) = cache();
        store
            .set("test.rates", json!({ "rates": "nope", "fetchedAt": "yesterday" }))
            .await
            .unwrap();

        assert_eq!(cache.load().await.unwrap(), None);
        assert!(cache.is_stale(0));
    }

    #[tokio::test]
    async fn test_persist_empty_cache_writes_nothing() {
        let (store, cache) = cache();
        cache.persist().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reset() {
        let (store, cache) = cache();
        cache.write(eur(0.85), RateOrigin::live("p"), 1);
        cache.persist().await.unwrap();

        cache.reset().await.unwrap();

        assert!(cache.read().is_none());
        assert_eq!(store.get("test.rates").await.unwrap(), None);
    }
}
