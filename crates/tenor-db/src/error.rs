//! Database-specific error types and conversions.

use tenor_core::error::TenorError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {constraint}")]
    Conflict { constraint: String },
}

impl DbError {
    /// Classify a failed statement. Unique index violations become
    /// [`DbError::Conflict`] naming the index.
    pub fn from_statement(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        match unique_index(&message) {
            Some(index) => DbError::Conflict { constraint: index },
            None => DbError::Query(message),
        }
    }
}

/// Extract the index name from a unique violation message such as
/// ``Database index `idx_customer_email` already contains 'a@b.c'``.
pub(crate) fn unique_index(message: &str) -> Option<String> {
    const MARKER: &str = "Database index `";
    let start = message.find(MARKER)? + MARKER.len();
    let len = message[start..].find('`')?;
    Some(message[start..start + len].to_string())
}

impl From<DbError> for TenorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TenorError::NotFound { entity, id },
            DbError::Conflict { constraint } => TenorError::Conflict { constraint },
            DbError::InvalidQuery(message) => TenorError::Validation { message },
            other => TenorError::Database(other.to_string()),
        }
    }
}
