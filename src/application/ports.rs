//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::submission::CleanSubmission;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Infrastructure provides `SystemClock`; tests use `MockClock`.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage of per-client sessions.
///
/// Infrastructure provides `ShardedStorage`.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Access an existing entry mutably without creating one.
    ///
    /// Returns `None` if the key is absent.
    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Port for session-scoped string storage (the browser's `sessionStorage`).
pub trait SessionStore: Send + Sync + Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: String);

    /// Delete a value.
    fn remove(&self, key: &str);
}

/// Error returned when handing an accepted submission off fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The receiving end could not be reached
    Unavailable(String),
    /// The receiving end refused the submission
    Refused(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Unavailable(reason) => write!(f, "delivery unavailable: {}", reason),
            DeliveryError::Refused(reason) => write!(f, "delivery refused: {}", reason),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Port for handing accepted submissions to whatever sends them on.
///
/// Infrastructure provides `SimulatedDelivery`, which only logs.
pub trait Delivery: Send + Sync + Debug {
    /// Deliver one accepted submission.
    fn deliver(&self, submission: &CleanSubmission) -> Result<(), DeliveryError>;
}

impl<T: Delivery + ?Sized> Delivery for std::sync::Arc<T> {
    fn deliver(&self, submission: &CleanSubmission) -> Result<(), DeliveryError> {
        (**self).deliver(submission)
    }
}
