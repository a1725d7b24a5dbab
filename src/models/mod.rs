// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components and shared response envelopes

pub mod admin;
pub mod blog;
pub mod contact;
pub mod project;
pub mod settings;

pub use admin::*;
pub use blog::*;
pub use contact::*;
pub use project::*;
pub use settings::*;

use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::services::listing::Pagination;

/// Success envelope shared by every endpoint
/// DOCUMENTATION: `{success: true, data, message?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Turn a slug candidate or title into a URL slug
/// Lowercases, keeps ASCII alphanumerics, collapses everything else into single dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Build a validator error for a value outside an allowed set
pub(crate) fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("must be one of: {}", allowed.join(", ")).into());
        Err(err)
    }
}

/// Flatten validator output into a single readable message
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, detail)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & MySQL --- Portfolio  "), "rust-mysql-portfolio");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_one_of() {
        assert!(one_of("draft", &["draft", "published"], "status").is_ok());
        let err = one_of("deleted", &["draft", "published"], "status").unwrap_err();
        assert_eq!(err.code, "status");
    }
}
