//! Atomic request counters.
//!
//! Each [`DeploymentHost`](crate::host::DeploymentHost) keeps its own
//! [`Metrics`]; the process-wide [`METRICS`] aggregates across hosts.
//! Call [`Metrics::flush`] to emit the current values as one `info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, aggregated across every host.
pub static METRICS: Metrics = Metrics::new();

/// Request and activation counters for one scope.
#[derive(Debug)]
pub struct Metrics {
    activations: AtomicU64,
    requests_handled: AtomicU64,
    requests_failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            activations: AtomicU64::new(0),
            requests_handled: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
        }
    }

    /// Count one successful activation.
    pub fn inc_activations(&self) {
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished request; `success` selects which counter moves.
    pub fn record_request(&self, success: bool) {
        if success {
            self.requests_handled.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
        tracing::trace!(metric = "requests", success = success, "counter incremented");
    }

    /// Emit the current counter values as one `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            activations = self.activations(),
            requests_handled = self.requests_handled(),
            requests_failed = self.requests_failed(),
        );
    }

    /// Successful activations so far.
    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }

    /// Requests that produced a result.
    pub fn requests_handled(&self) -> u64 {
        self.requests_handled.load(Ordering::Relaxed)
    }

    /// Requests that ended in a `RequestError`.
    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    /// Total requests seen, successful or not.
    pub fn requests_total(&self) -> u64 {
        self.requests_handled() + self.requests_failed()
    }
}
