//! Loan transaction domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{FieldKind, FieldSpec};
use crate::models::customer::Customer;
use crate::models::customer_limit::LimitAdjustment;
use crate::models::installment::{NewInstallment, TransactionInstallment};

pub const TRANSACTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("customer_id", FieldKind::Uuid),
    FieldSpec::new("customer_limit_id", FieldKind::Uuid),
    FieldSpec::new("contract_number", FieldKind::Text),
    FieldSpec::new("asset_name", FieldKind::Text),
    FieldSpec::new("is_done", FieldKind::Boolean),
    FieldSpec::new("installment_count", FieldKind::Integer),
];

pub const TRANSACTION_SEARCH: &[&str] = &["asset_name", "contract_number"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanTransaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_limit_id: Uuid,
    pub asset_name: String,
    pub contract_number: String,
    pub is_done: bool,
    /// Principal ("on the road" price).
    pub otr: Decimal,
    pub admin_fee: Decimal,
    pub total: Decimal,
    pub installment_amount: Decimal,
    pub installment_count: u32,
    pub total_interest: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLoanTransaction {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_limit_id: Uuid,
    pub asset_name: String,
    pub contract_number: String,
    pub otr: Decimal,
    pub admin_fee: Decimal,
    pub total: Decimal,
    pub installment_amount: Decimal,
    pub installment_count: u32,
    pub total_interest: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Everything a loan booking writes, applied as one unit.
#[derive(Debug, Clone)]
pub struct LoanBooking {
    pub transaction: NewLoanTransaction,
    pub installments: Vec<NewInstallment>,
    pub limit_adjustments: Vec<LimitAdjustment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionWithInstallments {
    #[serde(flatten)]
    pub transaction: LoanTransaction,
    pub installments: Vec<TransactionInstallment>,
}

/// Staff view of a transaction with its customer and schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: LoanTransaction,
    pub customer: Customer,
    pub installments: Vec<TransactionInstallment>,
}
