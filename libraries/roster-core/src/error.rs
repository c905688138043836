/// Core error types for Roster
use crate::types::UserId;
use thiserror::Error;

/// Result type alias using `RosterError`
pub type Result<T> = std::result::Result<T, RosterError>;

/// Core error type for Roster
#[derive(Error, Debug)]
pub enum RosterError {
    /// One or more field-level validation rules failed
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Another user already owns this e-mail address
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Unknown field referenced in a query, selection or sort
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Operator or operand not applicable to the referenced field
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RosterError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid filter error
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(name: impl Into<String>) -> Self {
        Self::InvalidField(name.into())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for RosterError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
