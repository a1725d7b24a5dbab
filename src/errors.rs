// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the whole API

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// When set, 500 responses include the underlying error detail.
/// Only enabled for the development environment.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle whether internal error details are sent to clients
pub fn set_expose_details(expose: bool) {
    EXPOSE_DETAILS.store(expose, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Application-specific error types
/// DOCUMENTATION: Every failure the API can report
/// Each variant maps to an HTTP status code and the `{success: false, message}` envelope
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Too many login attempts. Please try again later.")]
    TooManyAttempts,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PortfolioError {
    /// Message placed in the response envelope
    /// Server-side failures are masked unless details are exposed
    pub fn public_message(&self) -> String {
        match self {
            PortfolioError::DatabaseError(_) | PortfolioError::InternalError(_) => {
                if expose_details() {
                    format!("Internal server error: {}", self)
                } else {
                    "Internal server error".to_string()
                }
            }
            other => other.to_string(),
        }
    }
}

/// Convert PortfolioError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON envelopes
impl ResponseError for PortfolioError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(json!({
            "success": false,
            "message": self.public_message(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            PortfolioError::Conflict(_) => StatusCode::CONFLICT,
            PortfolioError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortfolioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PortfolioError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PortfolioError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortfolioError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PortfolioError::Forbidden => StatusCode::FORBIDDEN,
            PortfolioError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            PortfolioError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for PortfolioError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PortfolioError::ValidationError(crate::models::describe_validation_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PortfolioError::NotFound("Project".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortfolioError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PortfolioError::Conflict("slug taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PortfolioError::TooManyAttempts.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let response = PortfolioError::ValidationError("Email is invalid".into()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Email is invalid");
    }

    #[test]
    fn test_internal_details_masked() {
        set_expose_details(false);
        let err = PortfolioError::DatabaseError("connection refused".into());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
