//! Shared Error Types
//!
//! Request validation failures raised by the shared domain types. The
//! backend wraps them into `BackendError` and renders them as
//! `400 Bad Request`.
//!
//! ```rust
//! use wishhub::shared::error::{require_non_empty, SharedError};
//!
//! assert_eq!(require_non_empty("title", "  Birthday ").unwrap(), "Birthday");
//! assert!(matches!(
//!     require_non_empty("title", "   "),
//!     Err(SharedError::EmptyField { field: "title" })
//! ));
//! ```
use thiserror::Error;

/// Errors raised while validating a request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A required text field was blank
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    /// A field held a value outside its allowed range or format
    #[error("Invalid {field}: {message}")]
    ValidationError {
        field: &'static str,
        message: String,
    },
}

impl SharedError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending request field
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } | Self::ValidationError { field, .. } => field,
        }
    }
}

/// Trim `value`, rejecting it when nothing is left
pub fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SharedError> {
    match value.trim() {
        "" => Err(SharedError::EmptyField { field }),
        trimmed => Ok(trimmed),
    }
}
