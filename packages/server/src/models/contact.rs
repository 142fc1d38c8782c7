use chrono::{DateTime, Utc};
use lettre::Address;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::mailer::DeliveryReport;

/// Maximum sender name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ContactSubmission {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub message: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContactResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Best-effort email outcome; persistence already happened either way.
    pub delivery: DeliveryReport,
}

impl ContactResponse {
    pub fn from_model(m: crate::entity::contact_message::Model, delivery: DeliveryReport) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            message: m.message,
            created_at: m.created_at,
            delivery,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::contact_message::Model> for MessageResponse {
    fn from(m: crate::entity::contact_message::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            message: m.message,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageListResponse {
    pub data: Vec<MessageResponse>,
    pub total: u64,
}

/// A submission whose fields all passed structural validation.
#[derive(Debug)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: Address,
    pub message: String,
}

/// Structurally validate a contact submission.
///
/// Unlike the fail-fast image checks, every field is checked and all
/// failures are reported together so the form can redisplay them at once.
pub fn validate_submission(req: &ContactSubmission) -> Result<ValidatedSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = req.name.trim();
    if name.is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "Name must not be empty".into(),
        });
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError {
            field: "name",
            message: format!("Name must be at most {MAX_NAME_LEN} characters"),
        });
    }

    let email = match req.email.trim().parse::<Address>() {
        Ok(address) => Some(address),
        Err(_) => {
            errors.push(FieldError {
                field: "email",
                message: "Enter a valid email address".into(),
            });
            None
        }
    };

    let message = req.message.trim();
    if message.is_empty() {
        errors.push(FieldError {
            field: "message",
            message: "Message must not be empty".into(),
        });
    }

    if let Some(email) = email
        && errors.is_empty()
    {
        Ok(ValidatedSubmission {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, email: &str, message: &str) -> ContactSubmission {
        ContactSubmission {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[test]
    fn a_valid_submission_passes() {
        let validated =
            validate_submission(&submission("Test User", "test@example.com", "Test message"))
                .unwrap();
        assert_eq!(validated.name, "Test User");
        assert_eq!(validated.email.to_string(), "test@example.com");
        assert_eq!(validated.message, "Test message");
    }

    #[test]
    fn fields_are_trimmed_before_validation() {
        let validated =
            validate_submission(&submission("  Test User ", " test@example.com ", " hi "))
                .unwrap();
        assert_eq!(validated.name, "Test User");
        assert_eq!(validated.message, "hi");
    }

    #[test]
    fn empty_name_is_reported_by_field() {
        let errors =
            validate_submission(&submission("", "test@example.com", "hello")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn overlong_name_is_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let errors =
            validate_submission(&submission(&long, "test@example.com", "hello")).unwrap_err();
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn malformed_email_is_reported_by_field() {
        for bad in ["", "plainly-wrong", "missing@tld@twice", "user@"] {
            let errors = validate_submission(&submission("Test", bad, "hello")).unwrap_err();
            assert!(
                errors.iter().any(|e| e.field == "email"),
                "expected email error for {bad:?}"
            );
        }
    }

    #[test]
    fn empty_message_is_reported_by_field() {
        let errors = validate_submission(&submission("Test", "test@example.com", "   "))
            .unwrap_err();
        assert_eq!(errors[0].field, "message");
    }

    #[test]
    fn all_failures_are_collected_together() {
        let errors = validate_submission(&submission("", "nope", "")).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
    }
}
