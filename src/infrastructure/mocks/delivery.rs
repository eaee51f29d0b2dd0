//! Delivery test double.

use crate::application::ports::{Delivery, DeliveryError};
use crate::domain::submission::CleanSubmission;
use std::sync::{Arc, Mutex};

/// Delivery that keeps every submission it receives, or refuses them all.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelivery {
    delivered: Arc<Mutex<Vec<CleanSubmission>>>,
    fail: bool,
}

impl RecordingDelivery {
    /// A delivery that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// A delivery that refuses everything.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Submissions delivered so far.
    pub fn delivered(&self) -> Vec<CleanSubmission> {
        self.delivered
            .lock()
            .expect("RecordingDelivery mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }
}

impl Delivery for RecordingDelivery {
    fn deliver(&self, submission: &CleanSubmission) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Unavailable("endpoint offline".to_string()));
        }
        self.delivered
            .lock()
            .expect("RecordingDelivery mutex poisoned - a test thread panicked while holding the lock")
            .push(submission.clone());
        Ok(())
    }
}
