/// Storage-specific errors
use roster_core::RosterError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Unique e-mail index violated
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Map a write failure, turning a unique violation into `DuplicateEmail`
    pub fn from_write(err: sqlx::Error, email: &str) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return Self::DuplicateEmail(email.to_string());
            }
        }
        Self::Database(err)
    }
}

impl From<StorageError> for RosterError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail(email) => RosterError::DuplicateEmail(email),
            other => RosterError::storage(other.to_string()),
        }
    }
}
