// src/client/error.rs
// DOCUMENTATION: Errors reported by the portfolio API client

use thiserror::Error;

/// Failure of a single network exchange (connection, timeout, body read)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} responded with HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Request to {endpoint} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of a single-shot failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
