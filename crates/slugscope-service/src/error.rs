use thiserror::Error;

use slugscope_core::types::ScopeId;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] slugscope_core::error::CoreError),

    #[error("Scope not found: {0}")]
    ScopeNotFound(ScopeId),

    #[error("No website found for scope {0}")]
    WebsiteNotFound(ScopeId),

    #[error("Path index error: {0}")]
    IndexError(String),

    #[error("Config lookup error: {0}")]
    ConfigError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No free path for '{value}' after {attempts} attempts")]
    CollisionExhausted { value: String, attempts: u32 },
}

impl ServiceError {
    /// Whether the error comes from resolving a scope or its website.
    #[must_use]
    pub const fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::ScopeNotFound(_) | Self::WebsiteNotFound(_))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
