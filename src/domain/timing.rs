//! Minimum fill-time heuristic.
//!
//! Humans need a few seconds to fill a contact form; scripts don't. The timer
//! is armed when the form becomes interactable and re-armed after every
//! accepted submission, otherwise one arming would allow unlimited instant
//! re-submissions.

use std::time::{Duration, Instant};

/// Default minimum time between the form appearing and a submission.
pub const DEFAULT_MIN_FILL_TIME: Duration = Duration::from_millis(3000);

/// Tracks when the form became visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTimer {
    min_fill: Duration,
    started_at: Option<Instant>,
}

impl FillTimer {
    /// Create an unarmed timer.
    pub fn new(min_fill: Duration) -> Self {
        Self {
            min_fill,
            started_at: None,
        }
    }

    /// Arm (or re-arm) the timer at `now`.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    /// Whether enough time has passed since the timer was armed.
    ///
    /// An unarmed timer never blocks.
    pub fn is_valid(&self, now: Instant) -> bool {
        match self.started_at {
            Some(start) => now.saturating_duration_since(start) >= self.min_fill,
            None => true,
        }
    }

    /// Time elapsed since arming, if armed.
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
    }

    /// Whether the timer has been armed.
    pub fn is_armed(&self) -> bool {
        self.started_at.is_some()
    }

    /// Configured minimum fill time.
    pub fn min_fill(&self) -> Duration {
        self.min_fill
    }
}

impl Default for FillTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FILL_TIME)
    }
}
