//! # form-gatekeeper
//!
//! Client-side gatekeeping for a contact form: field validation, HTML
//! sanitization, a honeypot, a minimum fill time, a sliding-window rate
//! limit and a spam heuristic, run as one short-circuiting pipeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use form_gatekeeper::{Gatekeeper, SubmissionAttempt};
//! use std::time::Duration;
//!
//! let mut gatekeeper = Gatekeeper::builder()
//!     .with_min_fill_time(Duration::ZERO)
//!     .build()
//!     .unwrap();
//! gatekeeper.start();
//!
//! let attempt = SubmissionAttempt::from_pairs([
//!     ("name", "Ada Lovelace"),
//!     ("email", "Ada@Example.com"),
//!     ("message", "I would like a quote for a new website."),
//! ]);
//!
//! let clean = gatekeeper.submit(&attempt).unwrap();
//! assert_eq!(clean.email(), Some("ada@example.com"));
//! assert_eq!(gatekeeper.remaining(), 2);
//! ```
//!
//! ## Pipeline
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | Stage | Rejection | Reason |
//! |-------|-----------|--------|
//! | Honeypot (`website_url` filled) | [`Rejection::InvalidSubmission`] | `invalid submission` |
//! | Fill time under 3 s | [`Rejection::TooFast`] | `too fast` |
//! | More than 3 submissions in 5 min | [`Rejection::RateLimited`] | `rate limited` |
//! | A required field is invalid | [`Rejection::Validation`] | `validation error` |
//! | Message matches a spam rule | [`Rejection::Spam`] | `spam detected` |
//!
//! Evaluation and commit are separate. [`Gatekeeper::evaluate`] has no accept
//! side effects; [`Gatekeeper::commit`] records the submission in the
//! rate-limit window and re-arms the fill timer once delivery succeeded.
//! [`FormController`] does both around a [`Delivery`] and turns the outcome
//! into user-facing feedback.
//!
//! ## Many clients
//!
//! [`SessionRegistry`] keeps one session per [`ClientId`] in sharded storage,
//! sharing a single [`Pipeline`]:
//!
//! ```rust
//! use form_gatekeeper::{ClientId, Gatekeeper};
//!
//! let registry = Gatekeeper::builder().build_registry().unwrap();
//! let alice = ClientId::from("alice");
//!
//! registry.start(&alice);
//! assert_eq!(registry.remaining(&alice), 3);
//! assert_eq!(registry.len(), 1);
//! ```
//!
//! ## Observability
//!
//! Decisions are logged through `tracing` (bot detections at `WARN`,
//! commits at `INFO`, other rejections at `DEBUG`) and counted in
//! [`Metrics`]:
//!
//! ```rust
//! # use form_gatekeeper::Gatekeeper;
//! let gatekeeper = Gatekeeper::default();
//! let snapshot = gatekeeper.metrics().snapshot();
//! println!("rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```
//!
//! ## Feature flags
//!
//! - `async`: `FormController::submit_delayed`, simulated delivery latency on tokio timers
//! - `serde`: deserialize [`GatekeeperConfig`] from configuration files
//! - `test-helpers`: mocks in `infrastructure::mocks`

/// Domain layer - pure validation, sanitization and limiting rules.
pub mod domain;

/// Application layer - the pipeline, sessions and the form controller.
pub mod application;

/// Infrastructure layer - clocks, storage, delivery and builders.
pub mod infrastructure;

pub use domain::{
    field::{
        validate_email, validate_field, validate_message, validate_name, validate_phone,
        validate_select, Field, FieldError, ValidationResult,
    },
    sanitize::{sanitize, sanitize_opt},
    spam::{detect, is_spam, SpamRule},
    submission::{
        CleanSubmission, PipelineState, Rejection, Stage, SubmissionAttempt, CSRF_FIELD,
        HONEYPOT_FIELD,
    },
    timing::{FillTimer, DEFAULT_MIN_FILL_TIME},
    window::{SubmissionWindow, DEFAULT_MAX_SUBMISSIONS, DEFAULT_WINDOW},
};

pub use application::{
    config::GatekeeperConfig,
    controller::{
        rejection_message, Feedback, FieldFeedback, FormController, Toast, ToastKind,
    },
    csrf::{generate_nonce, CsrfGuard},
    gatekeeper::Gatekeeper,
    metrics::{Metrics, MetricsSnapshot},
    pipeline::Pipeline,
    ports::{Clock, Delivery, DeliveryError, SessionStore, Storage},
    registry::{ClientId, SessionRegistry},
    session::Session,
};

#[cfg(feature = "async")]
pub use application::controller::DEFAULT_DELIVERY_LATENCY;

pub use infrastructure::{
    builder::{BuildError, DefaultSessionRegistry, GatekeeperBuilder},
    clock::SystemClock,
    delivery::SimulatedDelivery,
    session_store::MemorySessionStore,
    storage::ShardedStorage,
};
