//! Observability metrics for the submission pipeline.
//!
//! Counts accepted submissions and rejections per stage.

use crate::domain::submission::Stage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking pipeline outcomes.
///
/// All metrics use atomic operations so a single tracker can be shared by a
/// `SessionRegistry` serving many clients. Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Attempts that passed every check
    accepted: AtomicU64,
    /// Accepted attempts that were delivered and committed
    committed: AtomicU64,
    /// Accepted attempts whose delivery failed
    delivery_failures: AtomicU64,
    rejected_honeypot: AtomicU64,
    rejected_timing: AtomicU64,
    rejected_rate_limit: AtomicU64,
    rejected_validation: AtomicU64,
    rejected_spam: AtomicU64,
}

impl MetricsInner {
    fn rejected(&self, stage: Stage) -> &AtomicU64 {
        match stage {
            Stage::Honeypot => &self.rejected_honeypot,
            Stage::Timing => &self.rejected_timing,
            Stage::RateLimit => &self.rejected_rate_limit,
            Stage::Validation => &self.rejected_validation,
            Stage::Spam => &self.rejected_spam,
        }
    }
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.inner.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_committed(&self) {
        self.inner.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.inner.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self, stage: Stage) {
        self.inner.rejected(stage).fetch_add(1, Ordering::Relaxed);
    }

    /// Attempts that passed every check.
    pub fn accepted(&self) -> u64 {
        self.inner.accepted.load(Ordering::Relaxed)
    }

    /// Accepted attempts that were committed.
    pub fn committed(&self) -> u64 {
        self.inner.committed.load(Ordering::Relaxed)
    }

    /// Accepted attempts whose delivery failed.
    pub fn delivery_failures(&self) -> u64 {
        self.inner.delivery_failures.load(Ordering::Relaxed)
    }

    /// Rejections produced by one stage.
    pub fn rejected(&self, stage: Stage) -> u64 {
        self.inner.rejected(stage).load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted(),
            committed: self.committed(),
            delivery_failures: self.delivery_failures(),
            rejected_honeypot: self.rejected(Stage::Honeypot),
            rejected_timing: self.rejected(Stage::Timing),
            rejected_rate_limit: self.rejected(Stage::RateLimit),
            rejected_validation: self.rejected(Stage::Validation),
            rejected_spam: self.rejected(Stage::Spam),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        let inner = &self.inner;
        for counter in [
            &inner.accepted,
            &inner.committed,
            &inner.delivery_failures,
            &inner.rejected_honeypot,
            &inner.rejected_timing,
            &inner.rejected_rate_limit,
            &inner.rejected_validation,
            &inner.rejected_spam,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
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
    pub accepted: u64,
    pub committed: u64,
    pub delivery_failures: u64,
    pub rejected_honeypot: u64,
    pub rejected_timing: u64,
    pub rejected_rate_limit: u64,
    pub rejected_validation: u64,
    pub rejected_spam: u64,
}

impl MetricsSnapshot {
    /// Total rejections across all stages.
    pub fn total_rejected(&self) -> u64 {
        self.rejected_honeypot
            .saturating_add(self.rejected_timing)
            .saturating_add(self.rejected_rate_limit)
            .saturating_add(self.rejected_validation)
            .saturating_add(self.rejected_spam)
    }

    /// Total attempts evaluated (accepted + rejected).
    pub fn total_attempts(&self) -> u64 {
        self.accepted.saturating_add(self.total_rejected())
    }

    /// Ratio of rejected attempts to all attempts (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been evaluated.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.total_rejected() as f64 / total as f64
        }
    }

    /// Rejections caught by the cheap bot filters (honeypot and timing).
    pub fn bot_rejections(&self) -> u64 {
        self.rejected_honeypot.saturating_add(self.rejected_timing)
    }
}
