//! Capacity eviction and expiry sweep.
//!
//! Runs before every cache write. Both passes are best-effort: a corrupt
//! entry or a rejected delete is logged and skipped, never surfaced.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::codec;
use crate::cache::models::{CacheConfig, SweepReport};
use crate::cache::store::{namespace_keys, CacheStore};
use crate::metrics;
use tracing::{debug, warn};

/// Resident entry metadata collected during a sweep.
#[derive(Debug, Clone)]
struct ResidentEntry {
    key: String,
    created_at: i64,
}

/// Enforces the entry ceiling and TTL on a namespace.
#[derive(Debug, Clone)]
pub struct EvictionManager {
    prefix: String,
    max_entries: usize,
    ttl_ms: i64,
}

impl EvictionManager {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            max_entries: config.max_entries,
            ttl_ms: config.ttl_ms,
        }
    }

    /// Make room for one incoming entry and drop anything past its TTL.
    ///
    /// 1. Oldest-first eviction when the namespace holds `max_entries` or
    ///    more, removing one extra so the next write fits.
    /// 2. Expiry of every collected entry older than the TTL, including ones
    ///    step 1 already removed.
    pub fn prepare_for_write(&self, store: &dyn CacheStore, now: i64) -> SweepReport {
        let mut report = SweepReport::default();

        let keys = match namespace_keys(store, &self.prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to enumerate cache entries for cleanup: {}", e);
                return report;
            }
        };

        let mut resident = self.collect_resident(store, keys, &mut report);

        // Stable sort keeps enumeration order among equal timestamps
        resident.sort_by_key(|entry| entry.created_at);

        let mut evicted = vec![false; resident.len()];
        if resident.len() >= self.max_entries {
            let to_remove = resident.len() - self.max_entries + 1;
            for (i, entry) in resident.iter().take(to_remove).enumerate() {
                if self.remove(store, &entry.key, "evict") {
                    evicted[i] = true;
                    report.evicted += 1;
                } else {
                    report.failed += 1;
                }
            }
            debug!(
                "Evicted {} of {} cache entries (limit {})",
                report.evicted,
                resident.len(),
                self.max_entries
            );
        }

        for (i, entry) in resident.iter().enumerate() {
            if now.saturating_sub(entry.created_at) <= self.ttl_ms {
                continue;
            }
            if self.remove(store, &entry.key, "expire") {
                if !evicted[i] {
                    report.expired += 1;
                }
            } else {
                report.failed += 1;
            }
        }

        metrics::record_cache_removals("corrupt", report.corrupt);
        metrics::record_cache_removals("evicted", report.evicted);
        metrics::record_cache_removals("expired", report.expired);

        if report.removed() > 0 {
            debug!(
                "Cache cleanup removed {} entries (corrupt={}, evicted={}, expired={})",
                report.removed(),
                report.corrupt,
                report.evicted,
                report.expired
            );
        }
        report
    }

    fn collect_resident(
        &self,
        store: &dyn CacheStore,
        keys: Vec<String>,
        report: &mut SweepReport,
    ) -> Vec<ResidentEntry> {
        let mut resident = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = match store.get(&key) {
                Ok(Some(raw)) => raw,
                // Deleted by someone else since enumeration
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to read cache entry {}: {}", key, e);
                    continue;
                }
            };

            match codec::decode_header(&raw) {
                Ok(header) => resident.push(ResidentEntry {
                    key,
                    created_at: header.created_at,
                }),
                Err(e) => {
                    warn!("Removing corrupt cache entry {}: {}", key, e);
                    if self.remove(store, &key, "drop corrupt") {
                        report.corrupt += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }
        }
        resident
    }

    fn remove(&self, store: &dyn CacheStore, key: &str, action: &str) -> bool {
        match store.delete(key) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to {} cache entry {}: {}", action, key, e);
                false
            }
        }
    }
}
