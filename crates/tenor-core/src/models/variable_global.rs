//! Global configuration variable domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariableGlobal {
    pub id: Uuid,
    pub code: String,
    /// Stringified value; numeric variables hold a decimal literal.
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateVariableGlobal {
    pub code: String,
    pub value: String,
    pub description: Option<String>,
}
