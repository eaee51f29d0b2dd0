//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain rules and holds per-client state:
//! - Submission pipeline (checks in fixed order)
//! - Gatekeeper (pipeline + one client) and session registry (many clients)
//! - Form controller (user-facing feedback)
//! - CSRF token guard and metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod config;
pub mod controller;
pub mod csrf;
pub mod gatekeeper;
pub mod metrics;
pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod session;
