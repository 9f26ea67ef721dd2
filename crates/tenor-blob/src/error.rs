use tenor_core::error::TenorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),
}

impl From<BlobError> for TenorError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidKey(key) => TenorError::validation(format!("invalid blob key: {key}")),
            other => TenorError::Internal(other.to_string()),
        }
    }
}
