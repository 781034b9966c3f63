//! Atomic metrics aggregation for the question engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters for request volume, latency, errors, and cache traffic.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    requests: AtomicU64,
    latency_ns: AtomicU64,
    errors: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

/// A point-in-time reading of the collected metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency: Duration,
    pub error_rate: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request with its latency and outcome.
    pub fn record_request(&self, latency: Duration, success: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if !success {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let latency_ns = self.latency_ns.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);

        let avg_latency = if requests > 0 {
            Duration::from_nanos(latency_ns / requests)
        } else {
            Duration::ZERO
        };
        let error_rate = if requests > 0 {
            errors as f64 / requests as f64
        } else {
            0.0
        };
        let cache_total = hits + misses;
        let cache_hit_rate = if cache_total > 0 {
            hits as f64 / cache_total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_requests: requests,
            total_errors: errors,
            avg_latency,
            error_rate,
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.latency_ns.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }
}
