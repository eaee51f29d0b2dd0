//! Contact-form fields and their validators.
//!
//! Every validator is a pure function from a raw string to a
//! [`ValidationResult`]. On success the result carries the value to keep
//! (sanitized for free text, normalized for email and phone); on failure it
//! carries a [`FieldError`] with a fixed, user-facing French message.

use crate::domain::sanitize::sanitize;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Outcome of validating a single field value.
pub type ValidationResult = Result<String, FieldError>;

static NAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s'-]+$").expect("name pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z]{2,})+$",
    )
    .expect("email pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("phone pattern is valid"));

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;
const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 2000;

/// A field the gatekeeper knows how to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
    Service,
    Budget,
}

impl Field {
    /// All known fields, in form order.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Message,
        Field::Service,
        Field::Budget,
    ];

    /// Look up a field by its form name (`name`, `email`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Field::Name),
            "email" => Some(Field::Email),
            "phone" => Some(Field::Phone),
            "message" => Some(Field::Message),
            "service" => Some(Field::Service),
            "budget" => Some(Field::Budget),
            _ => None,
        }
    }

    /// The form name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Message => "message",
            Field::Service => "service",
            Field::Budget => "budget",
        }
    }

    /// Validate a raw value for this field.
    pub fn validate(&self, raw: &str) -> ValidationResult {
        match self {
            Field::Name => validate_name(raw),
            Field::Email => validate_email(raw),
            Field::Phone => validate_phone(raw),
            Field::Message => validate_message(raw),
            Field::Service | Field::Budget => validate_select(raw),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field value was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    NameTooShort,
    NameTooLong,
    NameInvalidCharacters,
    EmailTooLong,
    EmailInvalid,
    PhoneInvalid,
    MessageTooShort,
    MessageTooLong,
    SelectionMissing,
}

impl FieldError {
    /// The message shown next to the offending field.
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::NameTooShort => "Le nom doit contenir au moins 2 caractères.",
            FieldError::NameTooLong => "Le nom est trop long (max 100).",
            FieldError::NameInvalidCharacters => "Le nom contient des caractères non autorisés.",
            FieldError::EmailTooLong => "Email trop long.",
            FieldError::EmailInvalid => "Veuillez entrer un email valide.",
            FieldError::PhoneInvalid => "Numéro de téléphone invalide.",
            FieldError::MessageTooShort => "Le message doit contenir au moins 10 caractères.",
            FieldError::MessageTooLong => "Le message est trop long (max 2000).",
            FieldError::SelectionMissing => "Veuillez sélectionner une option.",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for FieldError {}

/// Validate a person's name: 2 to 100 characters of letters (accented Latin
/// included), spaces, apostrophes and hyphens.
pub fn validate_name(raw: &str) -> ValidationResult {
    let clean = raw.trim();
    let len = clean.chars().count();
    if len < NAME_MIN {
        return Err(FieldError::NameTooShort);
    }
    if len > NAME_MAX {
        return Err(FieldError::NameTooLong);
    }
    if !NAME_CHARSET.is_match(clean) {
        return Err(FieldError::NameInvalidCharacters);
    }
    Ok(sanitize(clean).into_owned())
}

/// Validate an email address and return it lowercased.
pub fn validate_email(raw: &str) -> ValidationResult {
    let clean = raw.trim().to_lowercase();
    if clean.chars().count() > EMAIL_MAX {
        return Err(FieldError::EmailTooLong);
    }
    if !EMAIL_PATTERN.is_match(&clean) {
        return Err(FieldError::EmailInvalid);
    }
    Ok(clean)
}

/// Validate an optional phone number. Whitespace is stripped; an empty value
/// is accepted as "not provided".
pub fn validate_phone(raw: &str) -> ValidationResult {
    let clean: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if clean.is_empty() {
        return Ok(clean);
    }
    if !PHONE_PATTERN.is_match(&clean) {
        return Err(FieldError::PhoneInvalid);
    }
    Ok(clean)
}

/// Validate the free-text message: 10 to 2000 characters after trimming.
///
/// Length is counted in Unicode scalar values, not UTF-16 code units, so a
/// character outside the Basic Multilingual Plane (most emoji) counts once.
pub fn validate_message(raw: &str) -> ValidationResult {
    let clean = raw.trim();
    let len = clean.chars().count();
    if len < MESSAGE_MIN {
        return Err(FieldError::MessageTooShort);
    }
    if len > MESSAGE_MAX {
        return Err(FieldError::MessageTooLong);
    }
    Ok(sanitize(clean).into_owned())
}

/// Validate a select box (service, budget): any non-empty choice.
pub fn validate_select(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return Err(FieldError::SelectionMissing);
    }
    Ok(sanitize(raw).into_owned())
}

/// Validate a value by form field name.
///
/// Names the gatekeeper does not know are accepted as-is.
pub fn validate_field(name: &str, raw: &str) -> ValidationResult {
    match Field::from_name(name) {
        Some(field) => field.validate(raw),
        None => Ok(raw.to_string()),
    }
}
