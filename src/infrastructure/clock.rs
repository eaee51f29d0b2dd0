//! Clock adapters for time operations.
//!
//! `SystemClock` is the production clock. Tests drive time with `MockClock`
//! from `crate::infrastructure::mocks`, available with the `test-helpers`
//! feature or in test builds.

use crate::application::ports::Clock;
use std::time::Instant;

/// Monotonic wall clock backed by `Instant::now()`.
///
/// Fill times and rate-limit windows are measured on a monotonic clock, so a
/// user changing their system time cannot reopen a closed window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
