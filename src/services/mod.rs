pub mod auth;
pub mod blog;
pub mod contact;
pub mod project;

pub use auth::AuthService;
pub use blog::BlogService;
pub use contact::ContactService;
pub use project::ProjectService;

use crate::error::{AppError, Result};

/// Required-field check used by the create paths; runs before any
/// external call so a bad request never triggers an upload
pub(crate) fn require(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{} is required", name))),
    }
}

/// Non-empty check for update fields: `None` still means keep, but a
/// provided value that trims to nothing would break the non-empty
/// invariant the create path enforces
pub(crate) fn non_empty(name: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::BadRequest(format!(
            "{} must not be empty",
            name
        ))),
        other => Ok(other),
    }
}

/// Map a unique-constraint violation to Conflict, anything else stays
/// a database error
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
