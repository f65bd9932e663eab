// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, HistogramVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // CACHE OPERATION METRICS
    // ============================================================================

    /// Cache operations by outcome
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("prediction_cache_operations_total", "Total prediction cache operations"),
        &["operation"], // operation: hit, miss, write, write_failed, expired, corrupt, evicted, cleared
        REGISTRY
    ).unwrap();

    /// Time spent inside public cache operations
    pub static ref CACHE_OPERATION_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new(
            "prediction_cache_operation_duration_seconds",
            "Prediction cache operation duration in seconds"
        )
        .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["operation"], // operation: get, put, clear, prune
        REGISTRY
    ).unwrap();

    // ============================================================================
    // OCCUPANCY METRICS
    // ============================================================================

    /// Resident entries as of the last stats() call
    pub static ref CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("prediction_cache_entries", "Current number of resident cache entries"),
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
        CACHE_OPERATION_DURATION.with_label_values(&["get"]).observe(0.0001);
        CACHE_ENTRIES.set(3.0);

        let metrics = gather_metrics();
        assert!(metrics.contains("prediction_cache_operations_total"));
        assert!(metrics.contains("prediction_cache_operation_duration_seconds"));
        assert!(metrics.contains("prediction_cache_entries"));
    }
}
