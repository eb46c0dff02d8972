use thiserror::Error;

use crate::validation::FieldValidationError;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl From<FieldValidationError> for CoreError {
    fn from(err: FieldValidationError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
