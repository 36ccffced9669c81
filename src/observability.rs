//! Observability hooks for store operations.
//!
//! Implement the `StoreMetrics` trait to feed repository activity into
//! your monitoring system:
//!
//! ```ignore
//! use crm_kit::observability::StoreMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl StoreMetrics for PrometheusMetrics {
//!     fn record_read(&self, _key: &str, _duration: Duration) {
//!         // counter!("store_reads").inc();
//!         // histogram!("store_latency").record(duration);
//!     }
//!     // ... implement other methods
//! }
//!
//! // let repo = Repository::new(store, session)
//! //     .with_metrics(Arc::new(PrometheusMetrics));
//! ```
//!
//! The trait's default method bodies log via the `log` crate, so wiring
//! in a unit struct with no overrides gives debug-level visibility for
//! free. `NoOpMetrics` (the repository default) overrides everything to
//! stay silent.
//!
//! The `record_decode_error` hook fires whenever a repository fails open
//! on a malformed blob - the one failure mode that is otherwise
//! invisible to callers, since they just see an empty collection.

use std::time::Duration;

/// Trait for store metrics collection.
pub trait StoreMetrics: Send + Sync {
    /// Record a collection read.
    fn record_read(&self, key: &str, duration: Duration) {
        debug!("Store READ: {} took {:?}", key, duration);
    }

    /// Record a collection write.
    fn record_write(&self, key: &str, duration: Duration) {
        debug!("Store WRITE: {} took {:?}", key, duration);
    }

    /// Record a collection removal.
    fn record_delete(&self, key: &str, duration: Duration) {
        debug!("Store DELETE: {} took {:?}", key, duration);
    }

    /// Record a fail-open decode of a malformed blob.
    fn record_decode_error(&self, key: &str, error: &str) {
        warn!("Store DECODE ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl StoreMetrics for NoOpMetrics {
    fn record_read(&self, _key: &str, _duration: Duration) {}
    fn record_write(&self, _key: &str, _duration: Duration) {}
    fn record_delete(&self, _key: &str, _duration: Duration) {}
    fn record_decode_error(&self, _key: &str, _error: &str) {}
}

/// Metrics implementation that logs every hook at debug level.
///
/// Useful during development; relies entirely on the trait's default
/// method bodies.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl StoreMetrics for LogMetrics {}
