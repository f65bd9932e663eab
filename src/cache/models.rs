//! Cache configuration and statistics models.

// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};

/// Namespace prefix shared by every prediction cache key in the medium.
pub const CACHE_PREFIX: &str = "flymply_prediction_cache_";

/// Maximum age of an entry before it is treated as expired (24 hours).
pub const TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Maximum number of resident entries.
pub const MAX_CACHE_SIZE: usize = 100;

/// Configuration for a prediction cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Key prefix isolating cache entries from other data in the medium.
    pub prefix: String,
    /// Maximum number of resident entries.
    pub max_entries: usize,
    /// Time-to-live in milliseconds.
    pub ttl_ms: i64,
}

impl CacheConfig {
    /// Default limits under a custom namespace.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    /// Provides default values for cache configuration.
    ///
    /// - `prefix`: `flymply_prediction_cache_`
    /// - `max_entries`: 100
    /// - `ttl_ms`: 86_400_000 (24 hours)
    fn default() -> Self {
        Self {
            prefix: CACHE_PREFIX.to_string(),
            max_entries: MAX_CACHE_SIZE,
            ttl_ms: TTL_MS,
        }
    }
}

/// Snapshot of cache occupancy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of resident keys in the namespace.
    pub size: usize,
    /// Configured capacity.
    pub max_size: usize,
}

/// Outcome of one eviction/expiry pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries that failed to decode and were removed.
    pub corrupt: usize,
    /// Entries removed to make room for the incoming write.
    pub evicted: usize,
    /// Entries removed because they outlived the TTL.
    pub expired: usize,
    /// Deletions that the medium rejected.
    pub failed: usize,
}

impl SweepReport {
    /// Total number of successful removals.
    pub fn removed(&self) -> usize {
        self.corrupt + self.evicted + self.expired
    }
}
