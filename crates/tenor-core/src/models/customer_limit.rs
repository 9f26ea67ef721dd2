//! Term-bucketed credit limit domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{FieldKind, FieldSpec};

/// Tenors (in months) every customer receives a limit bucket for.
pub const LIMIT_TERMS: [u32; 4] = [1, 2, 3, 6];

pub const CUSTOMER_LIMIT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("customer_id", FieldKind::Uuid),
    FieldSpec::new("term", FieldKind::Integer),
    FieldSpec::new("is_active", FieldKind::Boolean),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerLimit {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Tenor in months.
    pub term: u32,
    pub is_active: bool,
    pub amount_limit: Decimal,
    pub remaining_limit: Decimal,
    /// Incremented on every write; guards concurrent debits.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A staff decision setting one bucket's approved amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitApproval {
    pub limit_id: Uuid,
    pub amount: Decimal,
}

/// A version-checked write of a bucket's remaining capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitAdjustment {
    pub limit_id: Uuid,
    pub expected_version: u64,
    pub remaining_limit: Decimal,
}
