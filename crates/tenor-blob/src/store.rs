use crate::error::BlobError;

/// Keyed byte storage.
///
/// Keys are slash-separated relative paths such as
/// `customer/card-photo/<uuid>.jpg`.
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing blob.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Returns `None` if no blob is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
