// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

use std::time::Instant;

pub use registry::{
    gather_metrics,
    CACHE_OPERATIONS,
    CACHE_OPERATION_DURATION,
    CACHE_ENTRIES,
};

/// Helper to record cache lookups
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

/// Helper to record cache writes
pub fn record_cache_write(success: bool) {
    let operation = if success { "write" } else { "write_failed" };
    CACHE_OPERATIONS.with_label_values(&[operation]).inc();
}

/// Helper to record entry removals (expired, corrupt, evicted, cleared)
pub fn record_cache_removals(reason: &str, count: usize) {
    if count > 0 {
        CACHE_OPERATIONS
            .with_label_values(&[reason])
            .inc_by(count as f64);
    }
}

pub fn update_cache_entries(count: usize) {
    CACHE_ENTRIES.set(count as f64);
}

/// Helper to record how long a public operation took
pub fn record_operation_duration(operation: &str, started: Instant) {
    CACHE_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}
