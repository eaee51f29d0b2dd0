//! Headless form controller.
//!
//! Turns pipeline outcomes into what the page shows: a toast, per-field
//! error messages and whether the form should be cleared. Rendering is left
//! to the caller.

use crate::application::gatekeeper::Gatekeeper;
use crate::application::ports::Delivery;
use crate::domain::field::{validate_field, Field};
use crate::domain::sanitize::sanitize;
use crate::domain::submission::{CleanSubmission, Rejection, SubmissionAttempt};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

#[cfg(feature = "async")]
use std::time::Duration;

/// Round trip the contact page simulates before confirming a submission.
#[cfg(feature = "async")]
pub const DEFAULT_DELIVERY_LATENCY: Duration = Duration::from_millis(1500);

const MSG_SENT: &str = "Message envoyé avec succès ! Réponse sous 24h.";
const MSG_INVALID: &str = "Soumission invalide.";
const MSG_TOO_FAST: &str = "Veuillez prendre votre temps pour remplir le formulaire.";
const MSG_FIX_ERRORS: &str = "Veuillez corriger les erreurs du formulaire.";
const MSG_SPAM: &str = "Votre message a été détecté comme spam.";
const MSG_DELIVERY_FAILED: &str = "L'envoi a échoué. Veuillez réessayer.";

/// Toast style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A short notification. The text is already HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    fn new(kind: ToastKind, message: &str) -> Self {
        Self {
            kind,
            message: sanitize(message).into_owned(),
        }
    }

    fn error(message: &str) -> Self {
        Self::new(ToastKind::Error, message)
    }
}

/// Result of validating one field as the user edits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFeedback {
    pub field: String,
    /// Message to show under the field, `None` when valid
    pub error: Option<&'static str>,
}

impl FieldFeedback {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the page needs after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub toast: Toast,
    /// Error message per field name
    pub field_errors: BTreeMap<String, &'static str>,
    /// Whether the form inputs should be cleared
    pub reset_form: bool,
    /// The delivered submission, on success
    pub submission: Option<CleanSubmission>,
}

impl Feedback {
    /// Whether the submission went through.
    pub fn is_success(&self) -> bool {
        self.toast.kind == ToastKind::Success
    }
}

/// User-facing text for a rejection.
pub fn rejection_message(rejection: &Rejection) -> String {
    match rejection {
        Rejection::InvalidSubmission => MSG_INVALID.to_string(),
        Rejection::TooFast => MSG_TOO_FAST.to_string(),
        Rejection::RateLimited { reset_secs } => {
            format!("Trop de tentatives. Réessayez dans {}s.", reset_secs)
        }
        Rejection::Validation { .. } => MSG_FIX_ERRORS.to_string(),
        Rejection::Spam { .. } => MSG_SPAM.to_string(),
    }
}

/// Drives one form: validation while typing, gatekeeping on submit, delivery
/// of accepted submissions.
#[derive(Debug)]
pub struct FormController<D: Delivery> {
    gatekeeper: Gatekeeper,
    delivery: D,
}

impl<D: Delivery> FormController<D> {
    /// Create a controller. Call [`FormController::init`] once the form is
    /// on screen.
    pub fn new(gatekeeper: Gatekeeper, delivery: D) -> Self {
        Self {
            gatekeeper,
            delivery,
        }
    }

    /// The form became interactable: arm the fill timer.
    pub fn init(&mut self) {
        self.gatekeeper.start();
    }

    /// Validate a single field (blur / input events).
    pub fn validate_field(&self, name: &str, value: &str) -> FieldFeedback {
        FieldFeedback {
            field: name.to_string(),
            error: validate_field(name, value).err().map(|e| e.message()),
        }
    }

    /// Handle a submit: run the pipeline, deliver on success.
    pub fn submit(&mut self, attempt: &SubmissionAttempt) -> Feedback {
        match self.gatekeeper.evaluate(attempt) {
            Ok(clean) => self.complete(attempt, clean),
            Err(rejection) => self.rejected(attempt, &rejection),
        }
    }

    /// Like [`FormController::submit`], waiting `latency` between the checks
    /// and delivery, as a network round trip would.
    #[cfg(feature = "async")]
    pub async fn submit_delayed(
        &mut self,
        attempt: &SubmissionAttempt,
        latency: Duration,
    ) -> Feedback {
        match self.gatekeeper.evaluate(attempt) {
            Ok(clean) => {
                tokio::time::sleep(latency).await;
                self.complete(attempt, clean)
            }
            Err(rejection) => self.rejected(attempt, &rejection),
        }
    }

    fn complete(&mut self, attempt: &SubmissionAttempt, clean: CleanSubmission) -> Feedback {
        let field_errors = field_errors(attempt);
        match self.delivery.deliver(&clean) {
            Ok(()) => {
                if let Err(rejection) = self.gatekeeper.commit() {
                    warn!(reason = rejection.reason(), "delivered submission not recorded");
                    return self.rejected(attempt, &rejection);
                }
                info!(fields = clean.len(), "contact form submitted");
                Feedback {
                    toast: Toast::new(ToastKind::Success, MSG_SENT),
                    field_errors,
                    reset_form: true,
                    submission: Some(clean),
                }
            }
            Err(e) => {
                self.gatekeeper.metrics().record_delivery_failure();
                error!(error = %e, "failed to deliver contact form");
                Feedback {
                    toast: Toast::error(MSG_DELIVERY_FAILED),
                    field_errors,
                    reset_form: false,
                    submission: None,
                }
            }
        }
    }

    fn rejected(&self, attempt: &SubmissionAttempt, rejection: &Rejection) -> Feedback {
        let field_errors = match rejection {
            Rejection::Validation { errors } => {
                let mut all = field_errors(attempt);
                for (field, error) in errors {
                    all.insert(field.as_str().to_string(), error.message());
                }
                all
            }
            // Bot filters don't reveal which field is wrong
            _ => BTreeMap::new(),
        };
        Feedback {
            toast: Toast::error(&rejection_message(rejection)),
            field_errors,
            reset_form: false,
            submission: None,
        }
    }

    /// The underlying gatekeeper.
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// Mutable access to the gatekeeper.
    pub fn gatekeeper_mut(&mut self) -> &mut Gatekeeper {
        &mut self.gatekeeper
    }

    /// The delivery adapter.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }
}

/// Error message for every posted known field that fails validation.
fn field_errors(attempt: &SubmissionAttempt) -> BTreeMap<String, &'static str> {
    attempt
        .fields()
        .filter_map(|(name, raw)| {
            let field = Field::from_name(name)?;
            field
                .validate(raw)
                .err()
                .map(|e| (field.as_str().to_string(), e.message()))
        })
        .collect()
}
