//! Sliding-window submission limiter.
//!
//! Allows at most `max_submissions` accepted submissions within a trailing
//! `window`. Timestamps are kept oldest-first; expired entries are pruned
//! lazily from the front on every read.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of submissions allowed per window.
pub const DEFAULT_MAX_SUBMISSIONS: usize = 3;

/// Default window length (five minutes).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(300);

/// Submission history for a single client.
///
/// # Example
/// ```
/// use form_gatekeeper::SubmissionWindow;
/// use std::time::{Duration, Instant};
///
/// let mut window = SubmissionWindow::new(2, Duration::from_secs(60));
/// let now = Instant::now();
///
/// window.record(now);
/// window.record(now);
/// assert!(!window.can_submit(now));
/// assert_eq!(window.reset_after(now), 60);
///
/// // Once the oldest entry leaves the window, capacity frees up again
/// assert!(window.can_submit(now + Duration::from_secs(61)));
/// ```
#[derive(Debug, Clone)]
pub struct SubmissionWindow {
    max_submissions: usize,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl SubmissionWindow {
    /// Create an empty window.
    ///
    /// # Arguments
    /// * `max_submissions` - Submissions allowed within the window
    /// * `window` - Length of the sliding window
    pub fn new(max_submissions: usize, window: Duration) -> Self {
        Self {
            max_submissions,
            window,
            timestamps: VecDeque::with_capacity(max_submissions),
        }
    }

    /// Remove entries older than the window.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Whether another submission would be within the limit.
    pub fn can_submit(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.timestamps.len() < self.max_submissions
    }

    /// Record an accepted submission.
    ///
    /// Only call this once the submission has actually gone through;
    /// recording speculatively consumes capacity for nothing.
    pub fn record(&mut self, now: Instant) {
        // A clock that steps backwards must not break ordering.
        let at = match self.timestamps.back() {
            Some(&last) if last > now => last,
            _ => now,
        };
        self.timestamps.push_back(at);
    }

    /// Submissions still available in the current window.
    pub fn remaining(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.max_submissions.saturating_sub(self.timestamps.len())
    }

    /// Whole seconds until the oldest submission leaves the window.
    ///
    /// Rounded up, and zero when the window is empty.
    pub fn reset_after(&mut self, now: Instant) -> u64 {
        self.prune(now);
        let Some(&oldest) = self.timestamps.front() else {
            return 0;
        };
        let left = self
            .window
            .saturating_sub(now.saturating_duration_since(oldest));
        let millis = u64::try_from(left.as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000)
    }

    /// Number of submissions currently tracked (without pruning).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether no submissions are tracked (without pruning).
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Configured maximum per window.
    pub fn max_submissions(&self) -> usize {
        self.max_submissions
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Forget all recorded submissions.
    pub fn reset(&mut self) {
        self.timestamps.clear();
    }
}

impl Default for SubmissionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBMISSIONS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_limit_reached_after_three() {
        let mut window = SubmissionWindow::default();
        let now = Instant::now();

        for i in 0..3 {
            assert!(window.can_submit(now), "submission {} should be allowed", i + 1);
            window.record(now);
        }
        assert!(!window.can_submit(now));
        assert_eq!(window.remaining(now), 0);
    }

    #[test]
    fn test_oldest_pruned_after_window() {
        let mut window = SubmissionWindow::default();
        let start = Instant::now();

        window.record(start);
        window.record(start + Duration::from_secs(10));
        window.record(start + Duration::from_secs(20));
        assert!(!window.can_submit(start + Duration::from_secs(30)));

        // Exactly at the boundary the entry is still inside the window
        assert!(!window.can_submit(start + DEFAULT_WINDOW));

        let later = start + DEFAULT_WINDOW + Duration::from_millis(1);
        assert!(window.can_submit(later));
        assert_eq!(window.len(), 2);
        assert_eq!(window.remaining(later), 1);
    }

    #[test]
    fn test_reset_after() {
        let mut window = SubmissionWindow::default();
        let start = Instant::now();

        assert_eq!(window.reset_after(start), 0);

        window.record(start);
        assert_eq!(window.reset_after(start), 300);
        assert_eq!(window.reset_after(start + Duration::from_millis(1500)), 299);
        assert_eq!(window.reset_after(start + Duration::from_millis(299_001)), 1);
        assert_eq!(window.reset_after(start + Duration::from_secs(301)), 0);
    }

    #[test]
    fn test_reset_after_saturates_for_huge_window() {
        let mut window = SubmissionWindow::new(1, Duration::MAX);
        let now = Instant::now();
        window.record(now);

        assert_eq!(window.reset_after(now), u64::MAX.div_ceil(1000));
    }

    #[test]
    fn test_zero_capacity() {
        let mut window = SubmissionWindow::new(0, Duration::from_secs(60));
        assert!(!window.can_submit(Instant::now()));
    }

    #[test]
    fn test_record_keeps_order_when_clock_steps_back() {
        let mut window = SubmissionWindow::new(5, Duration::from_secs(60));
        let start = Instant::now() + Duration::from_secs(10);

        window.record(start);
        window.record(start - Duration::from_secs(5));

        let stamps: Vec<_> = window.timestamps.iter().copied().collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut window = SubmissionWindow::new(1, Duration::from_secs(60));
        let now = Instant::now();
        window.record(now);
        assert!(!window.can_submit(now));

        window.reset();
        assert!(window.can_submit(now));
        assert!(window.is_empty());
    }

    proptest! {
        #[test]
        fn prop_can_submit_iff_under_limit(n in 0usize..8) {
            let mut window = SubmissionWindow::default();
            let now = Instant::now();
            for _ in 0..n {
                window.record(now);
            }
            prop_assert_eq!(window.can_submit(now), n < DEFAULT_MAX_SUBMISSIONS);
        }

        #[test]
        fn prop_no_expired_entries_after_read(offsets in proptest::collection::vec(0u64..600, 0..10), probe in 0u64..900) {
            let start = Instant::now();
            let mut sorted = offsets.clone();
            sorted.sort_unstable();

            let mut window = SubmissionWindow::new(100, DEFAULT_WINDOW);
            for offset in &sorted {
                window.record(start + Duration::from_secs(*offset));
            }

            let now = start + Duration::from_secs(probe);
            window.can_submit(now);
            for stamp in &window.timestamps {
                prop_assert!(now.saturating_duration_since(*stamp) <= DEFAULT_WINDOW);
            }
        }
    }
}
