//! Domain layer - pure business logic with no I/O.
//!
//! This layer contains the rules a contact-form submission is held to:
//! - HTML sanitization
//! - Field validators
//! - Spam heuristic
//! - Sliding submission window and minimum fill timer
//! - Submission attempts, cleaned submissions and rejections
//!
//! Time is always passed in, so every type here is deterministic to test.

pub mod field;
pub mod sanitize;
pub mod spam;
pub mod submission;
pub mod timing;
pub mod window;
