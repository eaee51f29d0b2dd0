//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Session storage (sharded maps) and the CSRF key/value store
//! - Message delivery
//! - Validated construction of gatekeepers

pub mod builder;
pub mod clock;
pub mod delivery;
pub mod session_store;
pub mod storage;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for driving
/// fill timing and rate-limit windows, recording deliveries and capturing logs.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// form-gatekeeper = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
