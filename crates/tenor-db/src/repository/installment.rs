//! SurrealDB implementation of [`InstallmentRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::models::installment::TransactionInstallment;
use tenor_core::repository::InstallmentRepository;
use uuid::Uuid;

use super::{parse_decimal, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InstallmentRowWithId {
    record_id: String,
    transaction_id: String,
    term: u32,
    due_date: DateTime<Utc>,
    payment_at: Option<DateTime<Utc>>,
    payment_method: Option<String>,
    amount: String,
    amount_paid: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InstallmentRowWithId {
    fn try_into_installment(self) -> Result<TransactionInstallment, DbError> {
        Ok(TransactionInstallment {
            id: parse_uuid("transaction_installment", &self.record_id)?,
            transaction_id: parse_uuid("loan_transaction", &self.transaction_id)?,
            term: self.term,
            due_date: self.due_date,
            payment_at: self.payment_at,
            payment_method: self.payment_method,
            amount: parse_decimal("amount", &self.amount)?,
            amount_paid: parse_decimal("amount_paid", &self.amount_paid)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the installment repository.
#[derive(Clone)]
pub struct SurrealInstallmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInstallmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InstallmentRepository for SurrealInstallmentRepository<C> {
    async fn list_by_transaction(
        &self,
        transaction_id: Uuid,
    ) -> TenorResult<Vec<TransactionInstallment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM transaction_installment \
                 WHERE transaction_id = $transaction_id ORDER BY term ASC",
            )
            .bind(("transaction_id", transaction_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InstallmentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_installment())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
