//! Delivery adapters.

use crate::application::ports::{Delivery, DeliveryError};
use crate::domain::submission::CleanSubmission;
use tracing::info;

/// Stand-in for a real endpoint: logs the accepted submission and succeeds.
///
/// Only field names are logged, never values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDelivery;

impl SimulatedDelivery {
    pub fn new() -> Self {
        Self
    }
}

impl Delivery for SimulatedDelivery {
    fn deliver(&self, submission: &CleanSubmission) -> Result<(), DeliveryError> {
        let fields: Vec<&str> = submission.iter().map(|(name, _)| name).collect();
        info!(fields = ?fields, "simulated delivery of contact form");
        Ok(())
    }
}
