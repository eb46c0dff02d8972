use slugscope_core::error::CoreError;
use slugscope_core::validation::FieldValidationError;
use slugscope_service::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(#[from] FieldValidationError),

    #[error("Fixture could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Fixture could not be parsed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No fixture configured; set fixture.path")]
    MissingFixture,
}

pub type AppResult<T> = std::result::Result<T, AppError>;
