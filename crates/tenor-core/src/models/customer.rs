//! Customer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{FieldKind, FieldSpec};
use crate::models::customer_information_file::{
    CustomerInformationFile, NewCustomerInformationFile,
};
use crate::models::customer_limit::CustomerLimit;

/// Filterable customer columns.
pub const CUSTOMER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", FieldKind::Text),
    FieldSpec::new("email", FieldKind::Text),
    FieldSpec::new("is_active", FieldKind::Boolean),
];

/// Customer columns matched by the free-text `query`.
pub const CUSTOMER_SEARCH: &[&str] = &["name", "email"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string. Never serialized outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: Option<String>,
}

/// Sign-up payload persisted as one unit: the account, its KYC file and
/// one zero-amount limit bucket per term.
#[derive(Debug, Clone)]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub information: NewCustomerInformationFile,
    pub limit_terms: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisteredCustomer {
    pub customer: Customer,
    pub information: CustomerInformationFile,
    pub limits: Vec<CustomerLimit>,
}

/// A customer together with their KYC file, if one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    #[serde(flatten)]
    pub customer: Customer,
    pub information: Option<CustomerInformationFile>,
}
