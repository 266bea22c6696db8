//! Metrics instrumentation for tiered-cache.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `tiered_cache_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `tier`: l1, l2
//! - `operation`: get, set, delete, clear
//! - `outcome`: hit, miss, expired, error

use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// Record a lookup outcome against a tier.
pub fn record_lookup(tier: &'static str, outcome: &'static str) {
    counter!(
        "tiered_cache_lookups_total",
        "tier" => tier,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a write against a tier.
pub fn record_write(tier: &'static str, operation: &'static str, outcome: &'static str) {
    counter!(
        "tiered_cache_writes_total",
        "tier" => tier,
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record operation latency.
pub fn record_latency(operation: &'static str, duration: Duration) {
    histogram!(
        "tiered_cache_operation_seconds",
        "operation" => operation
    )
    .record(duration.as_secs_f64());
}

/// Set the current L1 item count.
pub fn set_l1_items(count: usize) {
    gauge!("tiered_cache_l1_items").set(count as f64);
}

/// Record entries evicted from L1 by the LRU spill path.
pub fn record_evictions(count: usize) {
    counter!("tiered_cache_evictions_total").increment(count as u64);
}

/// Record an L2 hit copied up into L1.
pub fn record_promotion() {
    counter!("tiered_cache_promotions_total").increment(1);
}

/// Record entries the maintenance sweep demoted to L2.
pub fn record_demotions(count: usize) {
    counter!("tiered_cache_demotions_total").increment(count as u64);
}

/// Record expired entries purged from L1.
pub fn record_expired_purged(count: usize) {
    counter!("tiered_cache_expired_purged_total").increment(count as u64);
}

/// Record one completed maintenance sweep.
pub fn record_sweep(duration: Duration) {
    counter!("tiered_cache_sweeps_total").increment(1);
    histogram!("tiered_cache_sweep_seconds").record(duration.as_secs_f64());
}

/// A timing guard that records latency on drop.
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These verify the API compiles and doesn't panic; with no recorder
    // installed the calls are no-ops.

    #[test]
    fn test_counters() {
        record_lookup("l1", "hit");
        record_lookup("l2", "miss");
        record_write("l2", "set", "error");
        record_evictions(3);
        record_promotion();
        record_demotions(2);
        record_expired_purged(5);
    }

    #[test]
    fn test_gauges_and_histograms() {
        set_l1_items(1234);
        record_latency("get", Duration::from_micros(100));
        record_sweep(Duration::from_millis(2));
    }

    #[test]
    fn test_latency_timer() {
        {
            let _timer = LatencyTimer::new("get");
            std::thread::sleep(Duration::from_micros(10));
        }
        // Recorded on drop
    }
}
