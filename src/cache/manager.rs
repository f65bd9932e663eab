// Cache manager - fingerprints windows and serves cached predictions
// Author: kelexine (https://github.com/kelexine)

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::codec::{self, CacheEntry};
use crate::cache::eviction::EvictionManager;
use crate::cache::fingerprint::{fingerprint, CacheKey};
use crate::cache::models::{CacheConfig, CacheStats, SweepReport};
use crate::cache::store::{namespace_keys, CacheStore};
use crate::metrics;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Prediction response cache over a shared key-value medium.
///
/// Every public operation swallows its own failures: a broken or full medium
/// degrades the cache to "always miss", it never fails the caller.
pub struct PredictionCache<S: CacheStore> {
    store: S,
    config: CacheConfig,
    eviction: EvictionManager,
    clock: Arc<dyn Clock>,
}

impl<S: CacheStore> PredictionCache<S> {
    /// Create a cache with the default namespace and limits
    pub fn new(store: S) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: S, config: CacheConfig) -> Self {
        Self {
            store,
            eviction: EvictionManager::new(&config),
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock used for timestamps and expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Storage key for a window under this cache's namespace.
    pub fn key_for<W: AsRef<[f64]>>(&self, window: &[W]) -> CacheKey {
        CacheKey::new(&self.config.prefix, &fingerprint(window))
    }

    /// Cache `response` as the answer for `window`.
    ///
    /// Runs eviction/expiry first, so other entries may disappear. Any
    /// failure is logged and the write is dropped.
    pub fn put<W, R>(&self, window: &[W], response: &R)
    where
        W: AsRef<[f64]>,
        R: Serialize,
    {
        let started = Instant::now();
        let fp = fingerprint(window);
        let key = CacheKey::new(&self.config.prefix, &fp);

        self.eviction
            .prepare_for_write(&self.store, self.clock.now_millis());

        let entry = CacheEntry::new(response, self.clock.now_millis(), fp.as_str());
        let stored = codec::encode(&entry).and_then(|raw| self.store.set(key.as_str(), &raw));

        match stored {
            Ok(()) => {
                debug!("Cached prediction under {}", key);
                metrics::record_cache_write(true);
            }
            Err(e) if e.is_medium_failure() => {
                warn!("Cache medium rejected write for {}, skipping: {}", key, e);
                metrics::record_cache_write(false);
            }
            Err(e) => {
                warn!("Failed to cache prediction: {}", e);
                metrics::record_cache_write(false);
            }
        }
        metrics::record_operation_duration("put", started);
    }

    /// Cached response for `window`, if present, decodable and within TTL.
    ///
    /// Corrupt and expired entries are deleted as a side effect.
    pub fn get<W, R>(&self, window: &[W]) -> Option<R>
    where
        W: AsRef<[f64]>,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let key = self.key_for(window);
        let result = self.lookup(&key);

        if result.is_some() {
            debug!("Cache hit: {}", key);
            metrics::record_cache_hit();
        } else {
            debug!("Cache miss: {}", key);
            metrics::record_cache_miss();
        }
        metrics::record_operation_duration("get", started);
        result
    }

    fn lookup<R: DeserializeOwned>(&self, key: &CacheKey) -> Option<R> {
        let raw = match self.store.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) if e.is_medium_failure() => {
                warn!("Cache medium unavailable, treating {} as a miss: {}", key, e);
                return None;
            }
            Err(e) => {
                warn!("Failed to retrieve cached prediction: {}", e);
                return None;
            }
        };

        let entry: CacheEntry<R> = match codec::decode(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding corrupt cache entry {}: {}", key, e);
                self.discard(key);
                metrics::record_cache_removals("corrupt", 1);
                return None;
            }
        };

        if entry.is_expired(self.clock.now_millis(), self.config.ttl_ms) {
            debug!("Cache entry {} expired", key);
            self.discard(key);
            metrics::record_cache_removals("expired", 1);
            return None;
        }

        Some(entry.response)
    }

    fn discard(&self, key: &CacheKey) {
        if let Err(e) = self.store.delete(key.as_str()) {
            warn!("Failed to delete cache entry {}: {}", key, e);
        }
    }

    /// Delete every entry in the namespace. Other data in the medium is left alone.
    pub fn clear_all(&self) {
        let started = Instant::now();
        let keys = match namespace_keys(&self.store, &self.config.prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to clear cache: {}", e);
                return;
            }
        };

        let mut cleared = 0;
        for key in &keys {
            match self.store.delete(key) {
                Ok(()) => cleared += 1,
                Err(e) => warn!("Failed to delete cache entry {}: {}", key, e),
            }
        }

        debug!("Cache cleared ({} of {} entries)", cleared, keys.len());
        metrics::record_cache_removals("cleared", cleared);
        metrics::record_operation_duration("clear", started);
    }

    /// Run eviction and expiry without writing anything.
    pub fn prune(&self) -> SweepReport {
        let started = Instant::now();
        let report = self
            .eviction
            .prepare_for_write(&self.store, self.clock.now_millis());
        metrics::record_operation_duration("prune", started);
        report
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let size = match namespace_keys(&self.store, &self.config.prefix) {
            Ok(keys) => keys.len(),
            Err(e) => {
                warn!("Failed to enumerate cache entries: {}", e);
                0
            }
        };
        metrics::update_cache_entries(size);

        CacheStats {
            size,
            max_size: self.config.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::models::{MAX_CACHE_SIZE, TTL_MS};
    use crate::cache::store::MemoryStore;
    use serde_json::{json, Value};

    const T0: i64 = 1_700_000_000_000;

    fn create_test_cache() -> (PredictionCache<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = PredictionCache::new(MemoryStore::new()).with_clock(clock.clone());
        (cache, clock)
    }

    fn window(seed: f64) -> Vec<Vec<f64>> {
        vec![vec![seed, 0.25, -1.0], vec![seed + 1.0, 0.5, 2.0]]
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _clock) = create_test_cache();
        let response = json!({"risk_level": "moderate", "probability": 0.37});

        cache.put(&window(1.0), &response);
        let cached: Option<Value> = cache.get(&window(1.0));
        assert_eq!(cached, Some(response));
    }

    #[test]
    fn test_stored_entry_layout() {
        let (cache, _clock) = create_test_cache();
        cache.put(&window(1.0), &json!("r"));

        let key = cache.key_for(&window(1.0));
        let raw = cache.store().get(key.as_str()).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["timestamp"], json!(T0));
        assert_eq!(value["windowHash"], json!(fingerprint(&window(1.0)).as_str()));
        assert!(key.as_str().starts_with("flymply_prediction_cache_"));
    }

    #[test]
    fn test_get_expired_entry_is_removed() {
        let (cache, clock) = create_test_cache();
        cache.put(&window(1.0), &json!(1));

        clock.advance(TTL_MS);
        assert_eq!(cache.get::<_, Value>(&window(1.0)), Some(json!(1)));

        clock.advance(1);
        assert_eq!(cache.get::<_, Value>(&window(1.0)), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_get_wrong_shape_is_treated_as_corrupt() {
        let (cache, _clock) = create_test_cache();
        cache.put(&window(1.0), &json!({"not": "a number"}));

        assert_eq!(cache.get::<_, u32>(&window(1.0)), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let (cache, clock) = create_test_cache();
        cache.put(&window(1.0), &json!("old"));
        clock.advance(10);
        cache.put(&window(1.0), &json!("new"));

        assert_eq!(cache.get::<_, Value>(&window(1.0)), Some(json!("new")));
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_put_at_capacity_makes_room() {
        let (cache, clock) = create_test_cache();
        for i in 0..MAX_CACHE_SIZE {
            cache.put(&window(i as f64), &json!(i));
            clock.advance(1);
        }
        assert_eq!(cache.stats().size, MAX_CACHE_SIZE);

        cache.put(&window(1_000.0), &json!("newest"));
        assert_eq!(cache.stats().size, MAX_CACHE_SIZE);
        assert_eq!(cache.get::<_, Value>(&window(0.0)), None);
        assert_eq!(cache.get::<_, Value>(&window(1_000.0)), Some(json!("newest")));
    }

    #[test]
    fn test_put_on_full_medium_is_silent() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = PredictionCache::new(MemoryStore::with_quota(16)).with_clock(clock);

        cache.put(&window(1.0), &json!({"large": "payload that does not fit"}));
        assert_eq!(cache.get::<_, Value>(&window(1.0)), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_put_unencodable_response_is_dropped() {
        let (cache, _clock) = create_test_cache();
        cache.put(&window(1.0), &json!("kept"));

        // JSON object keys must be strings
        let mut unencodable = std::collections::BTreeMap::new();
        unencodable.insert((1, 2), "tuple key");
        cache.put(&window(2.0), &unencodable);

        assert_eq!(cache.get::<_, Value>(&window(2.0)), None);
        assert_eq!(cache.get::<_, Value>(&window(1.0)), Some(json!("kept")));
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_prune_drops_expired_entries() {
        let (cache, clock) = create_test_cache();
        cache.put(&window(1.0), &json!(1));
        cache.put(&window(2.0), &json!(2));

        clock.advance(TTL_MS + 1);
        let report = cache.prune();
        assert_eq!(report.expired, 2);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_stats_reports_configured_max() {
        let store = MemoryStore::new();
        let cache = PredictionCache::with_config(
            store,
            CacheConfig {
                max_entries: 7,
                ..CacheConfig::default()
            },
        );
        assert_eq!(cache.stats(), CacheStats { size: 0, max_size: 7 });
    }
}
