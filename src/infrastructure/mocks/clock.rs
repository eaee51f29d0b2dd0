//! Controllable clock for tests.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock whose time only moves when a test says so.
///
/// Clones share the same time, so a test can hand one clone to a gatekeeper
/// and keep another to step through fill times and rate-limit windows.
///
/// # Examples
///
/// ```
/// use form_gatekeeper::infrastructure::mocks::MockClock;
/// use form_gatekeeper::{Gatekeeper, Rejection, SubmissionAttempt};
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
///
/// let clock = MockClock::new(Instant::now());
/// let mut gatekeeper = Gatekeeper::builder()
///     .with_clock(Arc::new(clock.clone()))
///     .build()
///     .unwrap();
/// let attempt = SubmissionAttempt::from_pairs([
///     ("name", "Ada Lovelace"),
///     ("email", "ada@example.com"),
///     ("message", "Hello from the docs"),
/// ]);
///
/// gatekeeper.start();
/// assert_eq!(gatekeeper.evaluate(&attempt), Err(Rejection::TooFast));
///
/// clock.advance(Duration::from_secs(3));
/// assert!(gatekeeper.evaluate(&attempt).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = instant;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let start = Instant::now();
        let clock = MockClock::new(start);
        let shared = clock.clone();

        assert_eq!(clock.now(), start);

        shared.advance(Duration::from_millis(3100));
        assert_eq!(clock.now(), start + Duration::from_millis(3100));

        clock.set(start);
        assert_eq!(shared.now(), start);
    }
}
