//! Authentication error types.

use tenor_core::error::TenorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("account no longer exists")]
    SubjectNotFound,

    #[error("authorization token not found")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for TenorError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword { .. } => TenorError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => TenorError::Internal(msg),
            other => TenorError::Unauthorized {
                reason: other.to_string(),
            },
        }
    }
}
