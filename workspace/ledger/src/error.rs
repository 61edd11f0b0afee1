use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

/// Error types for the ledger services
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed or missing input; nothing was written
    #[error("{0}")]
    Validation(String),

    /// A lookup matched zero rows
    #[error("{0}")]
    NotFound(String),

    /// A primary identifier already exists
    #[error("{0}")]
    Conflict(String),

    /// Credentials did not match
    #[error("{0}")]
    Unauthorized(String),

    /// Error from the database operations; the surrounding transaction was rolled back
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Conflict(_) => "CONFLICT",
            LedgerError::Unauthorized(_) => "UNAUTHORIZED",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }
}

impl From<ValidationErrors> for LedgerError {
    fn from(errors: ValidationErrors) -> Self {
        LedgerError::Validation(errors.to_string())
    }
}

/// Whether a database error is a unique-constraint violation.
pub fn is_unique_violation(error: &DbErr) -> bool {
    matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
