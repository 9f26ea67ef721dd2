//! Transaction installment domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionInstallment {
    pub id: Uuid,
    pub transaction_id: Uuid,
    /// 1-based position in the schedule.
    pub term: u32,
    pub due_date: DateTime<Utc>,
    pub payment_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled installment before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstallment {
    pub term: u32,
    pub due_date: DateTime<Utc>,
    pub amount: Decimal,
}
