//! Tenor Blob: keyed storage for uploaded KYC documents.

mod error;
mod file;
mod store;

pub use error::BlobError;
pub use file::{BlobConfig, FileStore};
pub use store::BlobStore;
