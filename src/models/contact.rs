// src/models/contact.rs
// DOCUMENTATION: Contact form submissions
// PURPOSE: Multi-step contact form input and stored submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub const CONTACT_STATUSES: &[&str] = &["new", "read", "replied", "archived"];

pub fn validate_contact_status(status: &str) -> Result<(), ValidationError> {
    super::one_of(status, CONTACT_STATUSES, "contact_status")
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub status: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of POST /api/contact
/// DOCUMENTATION: The frontend collects these over several steps and submits once
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub subject: Option<String>,

    #[validate(length(min = 10, max = 5000, message = "Message must be between 10 and 5000 characters"))]
    pub message: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub project_type: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub budget: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateContactStatusRequest {
    #[validate(custom = "validate_contact_status")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Request metadata captured alongside a submission
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, message: &str) -> CreateContactRequest {
        CreateContactRequest {
            name: "Ada Lovelace".into(),
            email: email.into(),
            subject: None,
            message: message.into(),
            project_type: Some("web".into()),
            budget: None,
            timeline: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(request("ada@example.com", "I would like a website.").validate().is_ok());
    }

    #[test]
    fn test_invalid_email_and_short_message() {
        let errors = request("not-an-email", "short").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("message"));

        let message = crate::models::describe_validation_errors(&errors);
        assert!(message.contains("A valid email address is required"));
    }

    #[test]
    fn test_status_update_validation() {
        let ok = UpdateContactStatusRequest { status: "replied".into() };
        assert!(ok.validate().is_ok());
        let bad = UpdateContactStatusRequest { status: "spam".into() };
        assert!(bad.validate().is_err());
    }
}
