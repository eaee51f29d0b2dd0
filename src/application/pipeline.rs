//! The submission pipeline.
//!
//! Runs the checks in a fixed order and stops at the first failure:
//!
//! 1. honeypot
//! 2. minimum fill time
//! 3. rate limit
//! 4. field validation (all fields, errors aggregated)
//! 5. spam heuristic on the message
//!
//! Cheap, high-confidence bot filters come first so scripted clients learn
//! nothing about which field is wrong. Evaluation has no accept side effects;
//! call [`Pipeline::commit`] once the submission has actually gone out.

use crate::application::config::GatekeeperConfig;
use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::application::session::Session;
use crate::domain::field::{validate_field, Field, FieldError};
use crate::domain::spam;
use crate::domain::submission::{
    CleanSubmission, PipelineState, Rejection, Stage, SubmissionAttempt,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stateless rules shared by every session.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<GatekeeperConfig>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl Pipeline {
    /// Create a pipeline.
    ///
    /// Limits are taken as given; use the builder for validated construction.
    pub fn new(config: GatekeeperConfig, clock: Arc<dyn Clock>, metrics: Metrics) -> Self {
        Self {
            config: Arc::new(config),
            clock,
            metrics,
        }
    }

    /// A fresh session using this pipeline's limits.
    pub fn new_session(&self) -> Session {
        Session::new(&self.config)
    }

    /// Arm the session's fill timer: the form just became interactable.
    pub fn start(&self, session: &mut Session) {
        let now = self.clock.now();
        session.touch(now);
        session.timer.start(now);
    }

    /// Run every check against `attempt`.
    ///
    /// Returns the cleaned values when all checks pass. Neither the rate
    /// limiter nor the fill timer is updated; see [`Pipeline::commit`].
    pub fn evaluate(
        &self,
        session: &mut Session,
        attempt: &SubmissionAttempt,
    ) -> Result<CleanSubmission, Rejection> {
        let now = self.clock.now();
        session.touch(now);

        match self.run_checks(session, attempt, now) {
            Ok(clean) => {
                self.metrics.record_accepted();
                session.state = PipelineState::Accepted;
                debug!(fields = clean.len(), "submission passed all checks");
                Ok(clean)
            }
            Err(rejection) => {
                self.metrics.record_rejected(rejection.stage());
                session.state = PipelineState::Rejected(rejection.clone());
                Err(rejection)
            }
        }
    }

    fn run_checks(
        &self,
        session: &mut Session,
        attempt: &SubmissionAttempt,
        now: std::time::Instant,
    ) -> Result<CleanSubmission, Rejection> {
        session.state = PipelineState::Checking(Stage::Honeypot);
        if !attempt.passes_honeypot() {
            warn!(stage = %Stage::Honeypot, "bot detected via honeypot");
            return Err(Rejection::InvalidSubmission);
        }

        session.state = PipelineState::Checking(Stage::Timing);
        if !session.timer.is_valid(now) {
            debug!(
                stage = %Stage::Timing,
                elapsed_ms = session.timer.elapsed(now).map(|d| d.as_millis() as u64),
                "submission faster than minimum fill time"
            );
            return Err(Rejection::TooFast);
        }

        session.state = PipelineState::Checking(Stage::RateLimit);
        if !session.window.can_submit(now) {
            let reset_secs = session.window.reset_after(now);
            debug!(stage = %Stage::RateLimit, reset_secs, "submission rate limited");
            return Err(Rejection::RateLimited { reset_secs });
        }

        session.state = PipelineState::Checking(Stage::Validation);
        let clean = self.validate(attempt).map_err(|errors| {
            debug!(
                stage = %Stage::Validation,
                invalid = errors.len(),
                "required fields failed validation"
            );
            Rejection::Validation { errors }
        })?;

        session.state = PipelineState::Checking(Stage::Spam);
        let message = attempt
            .field(Field::Message.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if let Some(rule) = spam::detect(message) {
            warn!(stage = %Stage::Spam, rule = %rule, "message flagged as spam");
            return Err(Rejection::Spam { rule });
        }

        Ok(clean)
    }

    /// Validate every posted field plus any required field left out.
    ///
    /// Invalid optional fields are dropped from the result; invalid required
    /// fields are collected into the error map.
    pub fn validate(
        &self,
        attempt: &SubmissionAttempt,
    ) -> Result<CleanSubmission, BTreeMap<Field, FieldError>> {
        let mut clean = CleanSubmission::default();
        let mut errors = BTreeMap::new();

        for (name, raw) in attempt.fields() {
            match validate_field(name, raw) {
                Ok(value) => clean.insert(name, value),
                Err(error) => {
                    if let Some(field) = Field::from_name(name) {
                        if self.config.is_required(field) {
                            errors.insert(field, error);
                        }
                    }
                }
            }
        }

        for &field in &self.config.required_fields {
            if attempt.field(field.as_str()).is_none() {
                if let Err(error) = field.validate("") {
                    errors.insert(field, error);
                }
            }
        }

        if errors.is_empty() {
            Ok(clean)
        } else {
            Err(errors)
        }
    }

    /// Apply the accept side effects: record the submission and re-arm the
    /// fill timer.
    ///
    /// The window is checked again first. Two attempts evaluated before
    /// either is committed both pass `evaluate`; only as many as the window
    /// still has room for are recorded, the rest get
    /// [`Rejection::RateLimited`] and leave the session untouched.
    pub fn commit(&self, session: &mut Session) -> Result<(), Rejection> {
        let now = self.clock.now();
        session.touch(now);
        if !session.window.can_submit(now) {
            let reset_secs = session.window.reset_after(now);
            warn!(
                stage = %Stage::RateLimit,
                reset_secs,
                "commit refused, window already full"
            );
            let rejection = Rejection::RateLimited { reset_secs };
            session.state = PipelineState::Rejected(rejection.clone());
            return Err(rejection);
        }
        session.window.record(now);
        session.timer.start(now);
        session.state = PipelineState::Idle;
        self.metrics.record_committed();
        info!(
            remaining = session.window.remaining(now),
            "submission recorded"
        );
        Ok(())
    }

    /// Evaluate and, on success, commit straight away.
    pub fn submit(
        &self,
        session: &mut Session,
        attempt: &SubmissionAttempt,
    ) -> Result<CleanSubmission, Rejection> {
        let clean = self.evaluate(session, attempt)?;
        self.commit(session)?;
        Ok(clean)
    }

    /// Whether the session may submit right now.
    pub fn can_submit(&self, session: &mut Session) -> bool {
        session.window.can_submit(self.clock.now())
    }

    /// Submissions left in the session's window.
    pub fn remaining(&self, session: &mut Session) -> usize {
        session.window.remaining(self.clock.now())
    }

    /// Seconds until the session's oldest submission expires.
    pub fn reset_after(&self, session: &mut Session) -> u64 {
        session.window.reset_after(self.clock.now())
    }

    /// Configured limits.
    pub fn config(&self) -> &GatekeeperConfig {
        &self.config
    }

    /// Shared metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The clock used for all decisions.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use std::time::{Duration, Instant};

    fn pipeline() -> (Pipeline, MockClock) {
        let clock = MockClock::new(Instant::now());
        let pipeline = Pipeline::new(
            GatekeeperConfig::default(),
            Arc::new(clock.clone()),
            Metrics::new(),
        );
        (pipeline, clock)
    }

    fn valid_attempt() -> SubmissionAttempt {
        SubmissionAttempt::from_pairs([
            ("name", "Camille Durand"),
            ("email", "camille@example.fr"),
            ("phone", ""),
            ("message", "Hello there!"),
            ("service", "branding"),
            ("budget", "5k-10k"),
            ("website_url", ""),
        ])
    }

    #[test]
    fn test_valid_attempt_accepted() {
        let (pipeline, clock) = pipeline();
        let mut session = pipeline.new_session();
        pipeline.start(&mut session);
        clock.advance(Duration::from_millis(3100));

        let clean = pipeline.evaluate(&mut session, &valid_attempt()).unwrap();
        assert_eq!(clean.email(), Some("camille@example.fr"));
        assert_eq!(clean.message(), Some("Hello there!"));
        assert_eq!(session.state(), &PipelineState::Accepted);

        // evaluation alone records nothing
        assert!(session.window().is_empty());
    }

    #[test]
    fn test_honeypot_beats_everything() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();
        // timer armed and not yet elapsed, so timing would also fail
        pipeline.start(&mut session);

        let attempt = valid_attempt().with_honeypot("https://spam.example");
        assert_eq!(
            pipeline.evaluate(&mut session, &attempt),
            Err(Rejection::InvalidSubmission)
        );
        assert_eq!(pipeline.metrics().rejected(Stage::Honeypot), 1);
    }

    #[test]
    fn test_too_fast() {
        let (pipeline, clock) = pipeline();
        let mut session = pipeline.new_session();
        pipeline.start(&mut session);
        clock.advance(Duration::from_millis(2999));

        assert_eq!(
            pipeline.evaluate(&mut session, &valid_attempt()),
            Err(Rejection::TooFast)
        );
    }

    #[test]
    fn test_timing_checked_before_validation() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();
        pipeline.start(&mut session);

        assert_eq!(
            pipeline.evaluate(&mut session, &SubmissionAttempt::new()),
            Err(Rejection::TooFast)
        );
    }

    #[test]
    fn test_validation_errors_aggregated() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();

        let attempt = SubmissionAttempt::from_pairs([
            ("name", "X"),
            ("email", "not-an-email"),
            ("message", "Hello there!"),
        ]);
        let Err(Rejection::Validation { errors }) = pipeline.evaluate(&mut session, &attempt)
        else {
            panic!("expected a validation rejection");
        };

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&Field::Name], FieldError::NameTooShort);
        assert_eq!(errors[&Field::Email], FieldError::EmailInvalid);
    }

    #[test]
    fn test_missing_required_field_reported() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();

        let attempt = SubmissionAttempt::from_pairs([
            ("email", "a@example.com"),
            ("message", "Hello there!"),
        ]);
        let Err(Rejection::Validation { errors }) = pipeline.evaluate(&mut session, &attempt)
        else {
            panic!("expected a validation rejection");
        };
        assert_eq!(errors.get(&Field::Name), Some(&FieldError::NameTooShort));
    }

    #[test]
    fn test_invalid_optional_field_dropped() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();

        let attempt = valid_attempt()
            .with_field("phone", "123")
            .with_field("budget", "");
        let clean = pipeline.evaluate(&mut session, &attempt).unwrap();

        assert_eq!(clean.get("phone"), None);
        assert_eq!(clean.get("budget"), None);
        assert_eq!(clean.get("service"), Some("branding"));
    }

    #[test]
    fn test_spam_checked_on_raw_message() {
        let (pipeline, _clock) = pipeline();
        let mut session = pipeline.new_session();

        let attempt = valid_attempt().with_field("message", "Nice site <script>alert(1)</script>");
        assert_eq!(
            pipeline.evaluate(&mut session, &attempt),
            Err(Rejection::Spam {
                rule: spam::SpamRule::ScriptTag
            })
        );
    }

    #[test]
    fn test_commit_records_and_rearms() {
        let (pipeline, clock) = pipeline();
        let mut session = pipeline.new_session();
        pipeline.start(&mut session);
        clock.advance(Duration::from_secs(4));

        pipeline.submit(&mut session, &valid_attempt()).unwrap();
        assert_eq!(session.window().len(), 1);
        assert_eq!(pipeline.remaining(&mut session), 2);

        // timer re-armed: an immediate resubmission is too fast
        assert_eq!(
            pipeline.evaluate(&mut session, &valid_attempt()),
            Err(Rejection::TooFast)
        );
    }

    #[test]
    fn test_commit_rechecks_window() {
        let (pipeline, clock) = pipeline();
        let mut session = pipeline.new_session();

        for _ in 0..2 {
            clock.advance(Duration::from_secs(4));
            pipeline.submit(&mut session, &valid_attempt()).unwrap();
        }
        clock.advance(Duration::from_secs(4));

        // both pass while one slot is left
        assert!(pipeline.evaluate(&mut session, &valid_attempt()).is_ok());
        assert!(pipeline.evaluate(&mut session, &valid_attempt()).is_ok());

        assert_eq!(pipeline.commit(&mut session), Ok(()));
        // submissions at t=4 and t=8; oldest expires 292s after t=12
        assert_eq!(
            pipeline.commit(&mut session),
            Err(Rejection::RateLimited { reset_secs: 292 })
        );
        assert_eq!(session.window().len(), 3);
        assert_eq!(pipeline.metrics().committed(), 3);
        assert_eq!(
            session.state(),
            &PipelineState::Rejected(Rejection::RateLimited { reset_secs: 292 })
        );
    }

    #[test]
    fn test_rate_limited_after_three() {
        let (pipeline, clock) = pipeline();
        let mut session = pipeline.new_session();

        for _ in 0..3 {
            clock.advance(Duration::from_secs(4));
            pipeline.submit(&mut session, &valid_attempt()).unwrap();
        }
        clock.advance(Duration::from_secs(4));

        let rejection = pipeline
            .evaluate(&mut session, &valid_attempt())
            .unwrap_err();
        assert_eq!(rejection.reason(), "rate limited");
        assert_eq!(rejection.reset_secs(), Some(288));
        assert!(!pipeline.can_submit(&mut session));
        assert_eq!(pipeline.reset_after(&mut session), 288);
    }
}
