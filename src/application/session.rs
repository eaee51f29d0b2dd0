//! Per-client mutable state.

use crate::application::config::GatekeeperConfig;
use crate::domain::submission::PipelineState;
use crate::domain::timing::FillTimer;
use crate::domain::window::SubmissionWindow;
use std::time::Instant;

/// Everything the pipeline remembers about one client: its submission
/// history, its fill timer and how its last attempt went.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) window: SubmissionWindow,
    pub(crate) timer: FillTimer,
    pub(crate) state: PipelineState,
    pub(crate) last_seen: Option<Instant>,
}

impl Session {
    /// Create a fresh session for the given limits.
    pub fn new(config: &GatekeeperConfig) -> Self {
        Self {
            window: SubmissionWindow::new(config.max_submissions, config.window),
            timer: FillTimer::new(config.min_fill_time),
            state: PipelineState::Idle,
            last_seen: None,
        }
    }

    /// Submission history.
    pub fn window(&self) -> &SubmissionWindow {
        &self.window
    }

    /// Fill timer.
    pub fn timer(&self) -> &FillTimer {
        &self.timer
    }

    /// Outcome of the most recent pipeline run.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// When the client was last active, if ever.
    pub fn last_seen(&self) -> Option<Instant> {
        self.last_seen
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_seen = Some(now);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&GatekeeperConfig::default())
    }
}
