//! Submission attempts and the outcomes of checking them.

use crate::domain::field::{Field, FieldError};
use crate::domain::spam::SpamRule;
use std::collections::BTreeMap;
use std::fmt;

/// Form name of the decoy field that humans never see.
pub const HONEYPOT_FIELD: &str = "website_url";

/// Form name of the hidden CSRF token field.
pub const CSRF_FIELD: &str = "_csrf";

/// Raw values from one attempt to submit the form.
///
/// The honeypot and CSRF token live in their own slots; every other name is
/// kept as a regular field.
///
/// # Example
/// ```
/// use form_gatekeeper::SubmissionAttempt;
///
/// let attempt = SubmissionAttempt::from_pairs([
///     ("name", "Ada Lovelace"),
///     ("email", "ada@example.com"),
///     ("website_url", ""),
/// ]);
/// assert_eq!(attempt.field("name"), Some("Ada Lovelace"));
/// assert!(attempt.passes_honeypot());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionAttempt {
    fields: BTreeMap<String, String>,
    honeypot: Option<String>,
    csrf_token: Option<String>,
}

impl SubmissionAttempt {
    /// Create an empty attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an attempt from `(name, value)` pairs as a form would post them.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |attempt, (name, value)| {
                attempt.with_field(name, value)
            })
    }

    /// Set a field value. The honeypot and CSRF names are routed to their
    /// dedicated slots.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            HONEYPOT_FIELD => self.honeypot = Some(value),
            CSRF_FIELD => self.csrf_token = Some(value),
            _ => {
                self.fields.insert(name, value);
            }
        }
        self
    }

    /// Set the honeypot value.
    pub fn with_honeypot(mut self, value: impl Into<String>) -> Self {
        self.honeypot = Some(value.into());
        self
    }

    /// Set the CSRF token posted with the form.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Raw value of a regular field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Iterate over regular fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Honeypot value, if the field was posted.
    pub fn honeypot(&self) -> Option<&str> {
        self.honeypot.as_deref()
    }

    /// CSRF token, if the field was posted.
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// The decoy must be missing or empty.
    pub fn passes_honeypot(&self) -> bool {
        self.honeypot.as_deref().map_or(true, str::is_empty)
    }
}

/// Validated values of an accepted submission.
///
/// Free text is HTML-escaped, email is lowercased, phone has whitespace
/// removed. Optional fields that failed validation are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSubmission {
    values: BTreeMap<String, String>,
}

impl CleanSubmission {
    pub(crate) fn insert(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    /// Value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The message field.
    pub fn message(&self) -> Option<&str> {
        self.get(Field::Message.as_str())
    }

    /// The email field.
    pub fn email(&self) -> Option<&str> {
        self.get(Field::Email.as_str())
    }

    /// Iterate over values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields kept.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no fields were kept.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pipeline stage, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Honeypot,
    Timing,
    RateLimit,
    Validation,
    Spam,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Honeypot => "honeypot",
            Stage::Timing => "timing",
            Stage::RateLimit => "rate_limit",
            Stage::Validation => "validation",
            Stage::Spam => "spam",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submission was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The honeypot was filled in
    InvalidSubmission,
    /// Submitted before the minimum fill time
    TooFast,
    /// Too many submissions in the window
    RateLimited {
        /// Seconds until a slot frees up
        reset_secs: u64,
    },
    /// One or more required fields are invalid
    Validation {
        /// Per-field errors, for every required field that failed
        errors: BTreeMap<Field, FieldError>,
    },
    /// The message matched a spam rule
    Spam {
        /// The first rule that matched
        rule: SpamRule,
    },
}

impl Rejection {
    /// Fixed reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::InvalidSubmission => "invalid submission",
            Rejection::TooFast => "too fast",
            Rejection::RateLimited { .. } => "rate limited",
            Rejection::Validation { .. } => "validation error",
            Rejection::Spam { .. } => "spam detected",
        }
    }

    /// Stage that produced this rejection.
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::InvalidSubmission => Stage::Honeypot,
            Rejection::TooFast => Stage::Timing,
            Rejection::RateLimited { .. } => Stage::RateLimit,
            Rejection::Validation { .. } => Stage::Validation,
            Rejection::Spam { .. } => Stage::Spam,
        }
    }

    /// Seconds to wait, for rate-limited rejections.
    pub fn reset_secs(&self) -> Option<u64> {
        match self {
            Rejection::RateLimited { reset_secs } => Some(*reset_secs),
            _ => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RateLimited { reset_secs } => {
                write!(f, "{} (retry in {}s)", self.reason(), reset_secs)
            }
            Rejection::Validation { errors } => {
                write!(f, "{}: ", self.reason())?;
                let mut first = true;
                for field in errors.keys() {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", field)?;
                    first = false;
                }
                Ok(())
            }
            Rejection::Spam { rule } => write!(f, "{} ({})", self.reason(), rule),
            _ => f.write_str(self.reason()),
        }
    }
}

/// Where a session's most recent pipeline run ended up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Nothing evaluated yet
    #[default]
    Idle,
    /// A check is running
    Checking(Stage),
    /// All checks passed
    Accepted,
    /// A check failed
    Rejected(Rejection),
}
