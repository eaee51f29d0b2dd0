//! Single-client gatekeeper.
//!
//! Pairs a [`Pipeline`] with one [`Session`]. This is what a form running in
//! one browser tab needs: no global state, one value per client.

use crate::application::config::GatekeeperConfig;
use crate::application::metrics::Metrics;
use crate::application::pipeline::Pipeline;
use crate::application::session::Session;
use crate::domain::submission::{CleanSubmission, PipelineState, Rejection, SubmissionAttempt};

/// Submission pipeline plus the state of one client.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    pipeline: Pipeline,
    session: Session,
}

impl Gatekeeper {
    /// Create a gatekeeper with a fresh session.
    pub fn new(pipeline: Pipeline) -> Self {
        let session = pipeline.new_session();
        Self { pipeline, session }
    }

    /// Arm the fill timer. Call when the form becomes interactable.
    pub fn start(&mut self) {
        self.pipeline.start(&mut self.session);
    }

    /// Run all checks without side effects on acceptance.
    pub fn evaluate(&mut self, attempt: &SubmissionAttempt) -> Result<CleanSubmission, Rejection> {
        self.pipeline.evaluate(&mut self.session, attempt)
    }

    /// Record an accepted submission and re-arm the fill timer.
    ///
    /// Fails with [`Rejection::RateLimited`] if the window filled up since
    /// the attempt was evaluated.
    pub fn commit(&mut self) -> Result<(), Rejection> {
        self.pipeline.commit(&mut self.session)
    }

    /// Evaluate and commit on success.
    pub fn submit(&mut self, attempt: &SubmissionAttempt) -> Result<CleanSubmission, Rejection> {
        self.pipeline.submit(&mut self.session, attempt)
    }

    /// Whether another submission is within the rate limit.
    pub fn can_submit(&mut self) -> bool {
        self.pipeline.can_submit(&mut self.session)
    }

    /// Submissions left in the current window.
    pub fn remaining(&mut self) -> usize {
        self.pipeline.remaining(&mut self.session)
    }

    /// Seconds until the oldest recorded submission leaves the window.
    pub fn reset_after(&mut self) -> u64 {
        self.pipeline.reset_after(&mut self.session)
    }

    /// Outcome of the most recent evaluation.
    pub fn state(&self) -> &PipelineState {
        self.session.state()
    }

    /// This client's session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The shared pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Configured limits.
    pub fn config(&self) -> &GatekeeperConfig {
        self.pipeline.config()
    }

    /// Pipeline metrics.
    pub fn metrics(&self) -> &Metrics {
        self.pipeline.metrics()
    }
}
