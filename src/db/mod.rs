// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export repositories and share error mapping

pub mod admin_repository;
pub mod blog_repository;
pub mod contact_repository;
pub mod project_repository;
pub mod settings_repository;

pub use admin_repository::*;
pub use blog_repository::*;
pub use contact_repository::*;
pub use project_repository::*;
pub use settings_repository::*;

use crate::errors::PortfolioError;

/// Log a failed query and convert it into an API error
/// Unique key violations become 409 Conflict
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> PortfolioError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            log::warn!("{}: duplicate entry ({})", context, db_err.message());
            return PortfolioError::Conflict(format!("{}: a record with the same unique value already exists", context));
        }
    }
    log::error!("{}: {}", context, e);
    PortfolioError::DatabaseError(e.to_string())
}

/// Wrap a search term for a LIKE comparison, escaping wildcards
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" rust "), "%rust%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = db_error("Fetch project", sqlx::Error::RowNotFound);
        assert!(matches!(err, PortfolioError::DatabaseError(_)));
    }
}
