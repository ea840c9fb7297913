//! Shared primitives for all Rust crates in Porta.

#![forbid(unsafe_code)]

/// Stable identifiers for portal records.
pub mod ids;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ids::{ActionConfigurationId, ContactId, WebRoleId};

/// Result type used across Porta crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is anonymous or holds none of the required roles.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No active action configuration exists for the operation.
    #[error("no configuration set for operation '{0}'")]
    ConfigurationNotFound(String),

    /// The configured action type cannot be dispatched.
    #[error("unsupported action type '{0}'")]
    UnsupportedActionType(String),

    /// The downstream custom API failed or returned an unusable response.
    #[error("downstream invocation failed: {0}")]
    Downstream(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error's message without its category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::ConfigurationNotFound(message)
            | Self::UnsupportedActionType(message)
            | Self::Downstream(message)
            | Self::Internal(message) => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn configuration_not_found_names_operation() {
        let error = AppError::ConfigurationNotFound("porta_Greeter".to_owned());
        assert_eq!(
            error.to_string(),
            "no configuration set for operation 'porta_Greeter'"
        );
    }

    #[test]
    fn message_omits_category_prefix() {
        let error = AppError::Downstream("boom".to_owned());
        assert_eq!(error.message(), "boom");
        assert_eq!(error.to_string(), "downstream invocation failed: boom");
    }
}
