//! KYC photo validation.

use tenor_core::error::TenorError;
use thiserror::Error;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} exceeds {max_bytes} bytes")]
    TooLarge { field: &'static str, max_bytes: usize },

    #[error("{field} must be a JPEG or PNG image")]
    UnsupportedFormat { field: &'static str },
}

impl From<PhotoError> for TenorError {
    fn from(err: PhotoError) -> Self {
        TenorError::validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Detect the format from the leading bytes, ignoring any declared
    /// content type.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else if data.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

pub fn validate(field: &'static str, data: &[u8], max_bytes: usize) -> Result<ImageKind, PhotoError> {
    if data.is_empty() {
        return Err(PhotoError::Missing { field });
    }
    if data.len() > max_bytes {
        return Err(PhotoError::TooLarge { field, max_bytes });
    }
    ImageKind::sniff(data).ok_or(PhotoError::UnsupportedFormat { field })
}
