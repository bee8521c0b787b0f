/// Contact form payloads and validation
///
/// The wire payload arrives with every field optional so that a missing
/// field reports as a field error rather than a deserialization failure.
/// Validation either produces a clean `ContactSubmission` or a list of
/// `FieldError`s naming exactly which fields are wrong.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw contact form payload as posted by the client.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub event_date: Option<String>,
    pub message: Option<String>,
}

/// A validated contact form submission.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: String,
    pub event_date: Option<String>,
    pub message: String,
}

/// One validation problem, tied to the field that caused it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

const MIN_NAME_LEN: usize = 2;
const MIN_MESSAGE_LEN: usize = 10;
const MIN_PHONE_LEN: usize = 7;

impl ContactPayload {
    /// Validate every field, collecting all problems instead of stopping at
    /// the first one so the form can highlight everything at once.
    pub fn validate(self) -> Result<ContactSubmission, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = required_name(&self.first_name, "firstName", &mut errors);
        let last_name = required_name(&self.last_name, "lastName", &mut errors);

        let email = match self.email.as_deref().map(str::trim) {
            Some(e) if is_plausible_email(e) => e.to_string(),
            Some(_) => {
                errors.push(FieldError::new("email", "must be a valid email address"));
                String::new()
            }
            None => {
                errors.push(FieldError::new("email", "is required"));
                String::new()
            }
        };

        let service = match self.service.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                errors.push(FieldError::new("service", "is required"));
                String::new()
            }
        };

        let message = match self.message.as_deref().map(str::trim) {
            Some(m) if m.chars().count() >= MIN_MESSAGE_LEN => m.to_string(),
            Some(_) => {
                errors.push(FieldError::new(
                    "message",
                    "must be at least 10 characters",
                ));
                String::new()
            }
            None => {
                errors.push(FieldError::new("message", "is required"));
                String::new()
            }
        };

        let phone = match self.phone.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(p) if is_plausible_phone(p) => Some(p.to_string()),
            Some(_) => {
                errors.push(FieldError::new("phone", "must be a valid phone number"));
                None
            }
        };

        let event_date = match self.event_date.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(d) if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok() => Some(d.to_string()),
            Some(_) => {
                errors.push(FieldError::new(
                    "eventDate",
                    "must be a date in YYYY-MM-DD format",
                ));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactSubmission {
            first_name,
            last_name,
            email,
            phone,
            service,
            event_date,
            message,
        })
    }
}

fn required_name(value: &Option<String>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if v.chars().count() >= MIN_NAME_LEN => v.to_string(),
        Some(_) => {
            errors.push(FieldError::new(field, "must be at least 2 characters"));
            String::new()
        }
        None => {
            errors.push(FieldError::new(field, "is required"));
            String::new()
        }
    }
}

/// A deliberately loose mailbox check: one '@', a non-empty local part, and
/// a dotted domain. Real verification happens when we try to reply.
fn is_plausible_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if value.contains(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    // Domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Digits plus common punctuation, at least 7 meaningful characters.
fn is_plausible_phone(value: &str) -> bool {
    let meaningful = value.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || " +-().".contains(c));
    allowed && meaningful >= MIN_PHONE_LEN
}
