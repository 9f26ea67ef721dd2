//! Error types for the Tenor system.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenorError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {constraint}")]
    Conflict { constraint: String },

    #[error("Insufficient limit: remaining {remaining}, required {required}")]
    InsufficientLimit { remaining: Decimal, required: Decimal },

    #[error("Configuration missing: {code} ({reason})")]
    ConfigurationMissing { code: String, reason: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TenorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// HTTP status code the transport layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::InsufficientLimit { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::ConfigurationMissing { .. } | Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

pub type TenorResult<T> = Result<T, TenorError>;
