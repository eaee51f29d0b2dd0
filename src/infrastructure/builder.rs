//! Validated construction of gatekeepers and session registries.

use crate::application::{
    config::GatekeeperConfig,
    gatekeeper::Gatekeeper,
    metrics::Metrics,
    pipeline::Pipeline,
    ports::Clock,
    registry::{ClientId, SessionRegistry},
    session::Session,
};
use crate::domain::field::Field;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Error returned when building a gatekeeper fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Maximum submissions per window must be greater than zero
    ZeroMaxSubmissions,
    /// Rate-limit window must be longer than zero
    ZeroWindow,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ZeroMaxSubmissions => {
                write!(f, "max_submissions must be greater than 0")
            }
            BuildError::ZeroWindow => {
                write!(f, "rate limit window must be greater than 0")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Default session registry storage.
pub type DefaultSessionRegistry = SessionRegistry<Arc<ShardedStorage<ClientId, Session>>>;

/// Builder for [`Gatekeeper`] and [`SessionRegistry`].
///
/// # Example
/// ```
/// use form_gatekeeper::{Gatekeeper, Field};
/// use std::time::Duration;
///
/// let gatekeeper = Gatekeeper::builder()
///     .with_max_submissions(5)
///     .with_window(Duration::from_secs(600))
///     .with_required_fields([Field::Name, Field::Email, Field::Message, Field::Service])
///     .build()
///     .unwrap();
///
/// assert_eq!(gatekeeper.config().max_submissions, 5);
/// ```
#[derive(Debug, Default)]
pub struct GatekeeperBuilder {
    config: GatekeeperConfig,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Metrics>,
}

impl GatekeeperBuilder {
    /// Start from the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: GatekeeperConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how many submissions are accepted per window.
    ///
    /// The value will be validated when `build()` is called.
    pub fn with_max_submissions(mut self, max_submissions: usize) -> Self {
        self.config.max_submissions = max_submissions;
        self
    }

    /// Set the rate-limit window.
    ///
    /// The value will be validated when `build()` is called.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    /// Set the minimum fill time. Zero disables the timing check.
    pub fn with_min_fill_time(mut self, min_fill_time: Duration) -> Self {
        self.config.min_fill_time = min_fill_time;
        self
    }

    /// Set which fields block submission when invalid.
    pub fn with_required_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.config.required_fields = fields.into_iter().collect::<BTreeSet<_>>();
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the shared pipeline.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build_pipeline(self) -> Result<Pipeline, BuildError> {
        if self.config.max_submissions == 0 {
            return Err(BuildError::ZeroMaxSubmissions);
        }
        if self.config.window.is_zero() {
            return Err(BuildError::ZeroWindow);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let metrics = self.metrics.unwrap_or_default();
        Ok(Pipeline::new(self.config, clock, metrics))
    }

    /// Build a single-client gatekeeper.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build(self) -> Result<Gatekeeper, BuildError> {
        self.build_pipeline().map(Gatekeeper::new)
    }

    /// Build a registry serving many clients from sharded storage.
    ///
    /// # Errors
    /// Returns `BuildError` if the configuration is invalid.
    pub fn build_registry(self) -> Result<DefaultSessionRegistry, BuildError> {
        let pipeline = self.build_pipeline()?;
        Ok(SessionRegistry::new(pipeline, Arc::new(ShardedStorage::new())))
    }
}

impl Gatekeeper {
    /// Create a builder with the default limits.
    pub fn builder() -> GatekeeperBuilder {
        GatekeeperBuilder::new()
    }
}

impl Default for Gatekeeper {
    fn default() -> Self {
        let config = GatekeeperConfig::default();
        Gatekeeper::new(Pipeline::new(
            config,
            Arc::new(SystemClock::new()),
            Metrics::new(),
        ))
    }
}
