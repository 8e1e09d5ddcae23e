//! Observability metrics for admission and submission.
//!
//! Provides counters about gate and submitter behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking admission and submission statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// A gate and the submitter built on it share one `Metrics` instance.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Permits handed out by the gate
    permits_granted: AtomicU64,
    /// Acquires that found the gate exhausted and had to wait
    acquires_waited: AtomicU64,
    /// Replenish operations (manual and automatic)
    replenishments: AtomicU64,
    /// Submissions answered with status 200
    submissions_accepted: AtomicU64,
    /// Submissions answered with any other status
    submissions_rejected: AtomicU64,
    /// Submissions that failed before a response arrived
    transport_failures: AtomicU64,
    /// Submissions abandoned by the caller
    submissions_cancelled: AtomicU64,
    /// Submissions whose document could not be serialized
    encode_failures: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_granted(&self) {
        self.inner.permits_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_waited(&self) {
        self.inner.acquires_waited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replenish(&self) {
        self.inner.replenishments.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self) {
        self.inner
            .submissions_accepted
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner
            .submissions_rejected
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transport_failure(&self) {
        self.inner.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.inner
            .submissions_cancelled
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_encode_failure(&self) {
        self.inner.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of permits granted.
    pub fn permits_granted(&self) -> u64 {
        self.inner.permits_granted.load(Ordering::Relaxed)
    }

    /// Get the number of acquires that had to wait for a replenish.
    pub fn acquires_waited(&self) -> u64 {
        self.inner.acquires_waited.load(Ordering::Relaxed)
    }

    /// Get the number of replenish operations.
    pub fn replenishments(&self) -> u64 {
        self.inner.replenishments.load(Ordering::Relaxed)
    }

    /// Get the number of accepted submissions.
    pub fn submissions_accepted(&self) -> u64 {
        self.inner.submissions_accepted.load(Ordering::Relaxed)
    }

    /// Get the number of rejected submissions.
    pub fn submissions_rejected(&self) -> u64 {
        self.inner.submissions_rejected.load(Ordering::Relaxed)
    }

    /// Get the number of transport failures.
    pub fn transport_failures(&self) -> u64 {
        self.inner.transport_failures.load(Ordering::Relaxed)
    }

    /// Get the number of cancelled submissions.
    pub fn submissions_cancelled(&self) -> u64 {
        self.inner.submissions_cancelled.load(Ordering::Relaxed)
    }

    /// Get the number of documents that failed to serialize.
    pub fn encode_failures(&self) -> u64 {
        self.inner.encode_failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            permits_granted: self.permits_granted(),
            acquires_waited: self.acquires_waited(),
            replenishments: self.replenishments(),
            submissions_accepted: self.submissions_accepted(),
            submissions_rejected: self.submissions_rejected(),
            transport_failures: self.transport_failures(),
            submissions_cancelled: self.submissions_cancelled(),
            encode_failures: self.encode_failures(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.permits_granted.store(0, Ordering::Relaxed);
        self.inner.acquires_waited.store(0, Ordering::Relaxed);
        self.inner.replenishments.store(0, Ordering::Relaxed);
        self.inner.submissions_accepted.store(0, Ordering::Relaxed);
        self.inner.submissions_rejected.store(0, Ordering::Relaxed);
        self.inner.transport_failures.store(0, Ordering::Relaxed);
        self.inner.submissions_cancelled.store(0, Ordering::Relaxed);
        self.inner.encode_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Permits handed out by the gate
    pub permits_granted: u64,
    /// Acquires that had to wait
    pub acquires_waited: u64,
    /// Replenish operations
    pub replenishments: u64,
    /// Submissions answered with status 200
    pub submissions_accepted: u64,
    /// Submissions answered with any other status
    pub submissions_rejected: u64,
    /// Submissions that failed before a response arrived
    pub transport_failures: u64,
    /// Submissions abandoned by the caller
    pub submissions_cancelled: u64,
    /// Submissions whose document could not be serialized
    pub encode_failures: u64,
}

impl MetricsSnapshot {
    /// Total submissions that reached a final outcome.
    pub fn submissions_total(&self) -> u64 {
        self.submissions_accepted
            .saturating_add(self.submissions_rejected)
            .saturating_add(self.transport_failures)
            .saturating_add(self.submissions_cancelled)
            .saturating_add(self.encode_failures)
    }

    /// Calculate the rejection rate (0.0 to 1.0).
    ///
    /// Ratio of remote rejections to responses received.
    /// Returns 0.0 if no responses have been received.
    pub fn rejection_rate(&self) -> f64 {
        let answered = self
            .submissions_accepted
            .saturating_add(self.submissions_rejected);
        if answered == 0 {
            0.0
        } else {
            self.submissions_rejected as f64 / answered as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_counters() {
        let metrics = Metrics::new();

        metrics.record_granted();
        metrics.record_granted();
        metrics.record_waited();
        metrics.record_replenish();
        metrics.record_accepted();
        metrics.record_rejected();
        metrics.record_transport_failure();
        metrics.record_cancelled();
        metrics.record_encode_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.permits_granted, 2);
        assert_eq!(snapshot.acquires_waited, 1);
        assert_eq!(snapshot.replenishments, 1);
        assert_eq!(snapshot.submissions_accepted, 1);
        assert_eq!(snapshot.submissions_rejected, 1);
        assert_eq!(snapshot.transport_failures, 1);
        assert_eq!(snapshot.submissions_cancelled, 1);
        assert_eq!(snapshot.encode_failures, 1);
        assert_eq!(snapshot.submissions_total(), 5);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        clone.record_granted();
        assert_eq!(metrics.permits_granted(), 1);
    }

    #[test]
    fn test_rejection_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().rejection_rate(), 0.0);

        for _ in 0..3 {
            metrics.record_accepted();
        }
        metrics.record_rejected();
        // Transport failures are not answers and do not count.
        metrics.record_transport_failure();

        let rate = metrics.snapshot().rejection_rate();
        assert!((rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_granted();
        metrics.record_replenish();
        metrics.record_rejected();

        metrics.reset();

        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
