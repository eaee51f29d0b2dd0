//! Gatekeeper configuration.

use crate::domain::field::Field;
use crate::domain::timing::DEFAULT_MIN_FILL_TIME;
use crate::domain::window::{DEFAULT_MAX_SUBMISSIONS, DEFAULT_WINDOW};
use std::collections::BTreeSet;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Tunable limits for the submission pipeline.
///
/// Defaults: 3 submissions per 5 minutes, 3 seconds minimum fill time,
/// `name`, `email` and `message` required.
///
/// With the `serde` feature the config can be read from a file; durations are
/// given in milliseconds:
///
/// ```json
/// { "max_submissions": 5, "window_ms": 600000, "min_fill_time_ms": 2000,
///   "required_fields": ["name", "email", "message", "service"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct GatekeeperConfig {
    /// Accepted submissions allowed per window
    pub max_submissions: usize,
    /// Length of the rate-limit window
    #[cfg_attr(feature = "serde", serde(rename = "window_ms", with = "duration_ms"))]
    pub window: Duration,
    /// Minimum time between the form appearing and a submission
    #[cfg_attr(
        feature = "serde",
        serde(rename = "min_fill_time_ms", with = "duration_ms")
    )]
    pub min_fill_time: Duration,
    /// Fields whose validation failure blocks the submission
    #[cfg_attr(feature = "serde", serde(deserialize_with = "field_names"))]
    pub required_fields: BTreeSet<Field>,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            max_submissions: DEFAULT_MAX_SUBMISSIONS,
            window: DEFAULT_WINDOW,
            min_fill_time: DEFAULT_MIN_FILL_TIME,
            required_fields: BTreeSet::from([Field::Name, Field::Email, Field::Message]),
        }
    }
}

impl GatekeeperConfig {
    /// Whether a field blocks submission when invalid.
    pub fn is_required(&self, field: Field) -> bool {
        self.required_fields.contains(&field)
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(feature = "serde")]
fn field_names<'de, D>(deserializer: D) -> Result<BTreeSet<Field>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    names
        .iter()
        .map(|name| {
            Field::from_name(name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown form field `{}`", name)))
        })
        .collect()
}
