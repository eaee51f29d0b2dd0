//! Per-client session registry.
//!
//! Runs one [`Pipeline`] for many clients, keeping each client's
//! [`Session`] in concurrent storage. This is the shape a server-side
//! deployment takes, where every visitor gets their own rate-limit window
//! and fill timer.

use crate::application::pipeline::Pipeline;
use crate::application::ports::Storage;
use crate::application::session::Session;
use crate::domain::submission::{CleanSubmission, Rejection, SubmissionAttempt};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info_span};

/// Opaque identifier for a client (session cookie, IP, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// Wrap a client identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Registry of client sessions sharing one pipeline.
///
/// Generic over the storage backend; in production use
/// `Arc<ShardedStorage<ClientId, Session>>`.
#[derive(Debug, Clone)]
pub struct SessionRegistry<S>
where
    S: Storage<ClientId, Session>,
{
    pipeline: Pipeline,
    storage: S,
}

impl<S> SessionRegistry<S>
where
    S: Storage<ClientId, Session>,
{
    /// Create a registry over `storage`.
    pub fn new(pipeline: Pipeline, storage: S) -> Self {
        Self { pipeline, storage }
    }

    fn with_session<F, R>(&self, client: &ClientId, f: F) -> R
    where
        F: FnOnce(&Pipeline, &mut Session) -> R,
    {
        let pipeline = &self.pipeline;
        let _span = info_span!("session", client = %client).entered();
        self.storage.with_entry_mut(
            client.clone(),
            || pipeline.new_session(),
            |session| f(pipeline, session),
        )
    }

    /// Arm the client's fill timer.
    pub fn start(&self, client: &ClientId) {
        self.with_session(client, |pipeline, session| pipeline.start(session));
    }

    /// Evaluate an attempt for a client without accept side effects.
    pub fn evaluate(
        &self,
        client: &ClientId,
        attempt: &SubmissionAttempt,
    ) -> Result<CleanSubmission, Rejection> {
        self.with_session(client, |pipeline, session| {
            pipeline.evaluate(session, attempt)
        })
    }

    /// Record an accepted submission for a client.
    ///
    /// The window is re-checked under the same entry lock, so concurrent
    /// requests for one client never record more than the limit.
    pub fn commit(&self, client: &ClientId) -> Result<(), Rejection> {
        self.with_session(client, |pipeline, session| pipeline.commit(session))
    }

    /// Evaluate and commit on success.
    pub fn submit(
        &self,
        client: &ClientId,
        attempt: &SubmissionAttempt,
    ) -> Result<CleanSubmission, Rejection> {
        self.with_session(client, |pipeline, session| {
            pipeline.submit(session, attempt)
        })
    }

    /// Submissions left for a client.
    ///
    /// Unknown clients get the full allowance and are not added.
    pub fn remaining(&self, client: &ClientId) -> usize {
        let pipeline = &self.pipeline;
        self.storage
            .with_existing_mut(client, |session| pipeline.remaining(session))
            .unwrap_or(pipeline.config().max_submissions)
    }

    /// Seconds until a client's oldest submission expires.
    ///
    /// Zero for unknown clients, which are not added.
    pub fn reset_after(&self, client: &ClientId) -> u64 {
        let pipeline = &self.pipeline;
        self.storage
            .with_existing_mut(client, |session| pipeline.reset_after(session))
            .unwrap_or(0)
    }

    /// Drop sessions idle for longer than `max_idle`.
    ///
    /// Returns how many sessions were removed.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let now = self.pipeline.clock().now();
        let before = self.storage.len();
        self.storage.retain(|_, session| match session.last_seen() {
            Some(seen) => now.saturating_duration_since(seen) <= max_idle,
            None => false,
        });
        let removed = before.saturating_sub(self.storage.len());
        if removed > 0 {
            debug!(removed, "pruned idle sessions");
        }
        removed
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no clients are tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Forget every client.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// The shared pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::GatekeeperConfig;
    use crate::application::metrics::Metrics;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Arc;
    use std::time::Instant;

    fn registry() -> (SessionRegistry<Arc<ShardedStorage<ClientId, Session>>>, MockClock) {
        let clock = MockClock::new(Instant::now());
        let pipeline = Pipeline::new(
            GatekeeperConfig::default(),
            Arc::new(clock.clone()),
            Metrics::new(),
        );
        (
            SessionRegistry::new(pipeline, Arc::new(ShardedStorage::new())),
            clock,
        )
    }

    fn attempt() -> SubmissionAttempt {
        SubmissionAttempt::from_pairs([
            ("name", "Noé Petit"),
            ("email", "noe@example.org"),
            ("message", "Un projet de refonte."),
        ])
    }

    #[test]
    fn test_clients_limited_independently() {
        let (registry, clock) = registry();
        let alice = ClientId::from("alice");
        let bob = ClientId::from("bob");

        for _ in 0..3 {
            clock.advance(Duration::from_secs(5));
            registry.submit(&alice, &attempt()).unwrap();
        }
        clock.advance(Duration::from_secs(5));

        assert!(matches!(
            registry.submit(&alice, &attempt()),
            Err(Rejection::RateLimited { .. })
        ));
        assert!(registry.submit(&bob, &attempt()).is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_timer_is_per_client() {
        let (registry, clock) = registry();
        let alice = ClientId::from("alice");
        let bob = ClientId::from("bob");

        registry.start(&alice);
        clock.advance(Duration::from_secs(1));

        assert_eq!(registry.evaluate(&alice, &attempt()), Err(Rejection::TooFast));
        assert!(registry.evaluate(&bob, &attempt()).is_ok());
    }

    #[test]
    fn test_evaluate_does_not_consume_capacity() {
        let (registry, _clock) = registry();
        let client = ClientId::from("carol");

        for _ in 0..5 {
            registry.evaluate(&client, &attempt()).unwrap();
        }
        assert_eq!(registry.remaining(&client), 3);

        assert_eq!(registry.commit(&client), Ok(()));
        assert_eq!(registry.remaining(&client), 2);
        assert_eq!(registry.reset_after(&client), 300);
    }

    #[test]
    fn test_interleaved_commits_respect_limit() {
        let (registry, clock) = registry();
        let client = ClientId::from("dave");

        for _ in 0..2 {
            clock.advance(Duration::from_secs(5));
            registry.submit(&client, &attempt()).unwrap();
        }
        clock.advance(Duration::from_secs(5));

        // two requests in flight for the same client
        assert!(registry.evaluate(&client, &attempt()).is_ok());
        assert!(registry.evaluate(&client, &attempt()).is_ok());
        assert_eq!(registry.commit(&client), Ok(()));
        assert!(matches!(
            registry.commit(&client),
            Err(Rejection::RateLimited { .. })
        ));

        assert_eq!(registry.remaining(&client), 0);
        assert_eq!(registry.pipeline().metrics().committed(), 3);
    }

    #[test]
    fn test_concurrent_commits_respect_limit() {
        use std::thread;

        let (registry, _clock) = registry();
        let registry = Arc::new(registry);
        let client = ClientId::from("erin");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let client = client.clone();
                thread::spawn(move || registry.commit(&client).is_ok())
            })
            .collect();

        let committed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(committed, 3);
        assert_eq!(registry.remaining(&client), 0);
    }

    #[test]
    fn test_queries_do_not_register_clients() {
        let (registry, _clock) = registry();
        let ghost = ClientId::from("ghost");

        assert_eq!(registry.remaining(&ghost), 3);
        assert_eq!(registry.reset_after(&ghost), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prune_idle() {
        let (registry, clock) = registry();
        registry.start(&ClientId::from("old"));
        clock.advance(Duration::from_secs(600));
        registry.start(&ClientId::from("fresh"));

        assert_eq!(registry.prune_idle(Duration::from_secs(300)), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_clients() {
        use std::thread;

        let (registry, _clock) = registry();
        let registry = Arc::new(registry);
        let mut handles = vec![];

        for i in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let client = ClientId::new(format!("client-{}", i));
                let accepted = (0..5)
                    .filter(|_| registry.submit(&client, &attempt()).is_ok())
                    .count();
                accepted
            }));
        }

        for handle in handles {
            // the mock clock never moves, so only the first submission
            // passes before the re-armed timer blocks the rest
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.pipeline().metrics().committed(), 8);
    }
}
