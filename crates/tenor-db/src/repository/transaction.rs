//! SurrealDB implementation of [`TransactionRepository`].
//!
//! A booking is written by a single `BEGIN … COMMIT` query: the
//! transaction row, its installments and the version-checked update of
//! every limit bucket either all land or none do.

use chrono::{DateTime, Utc};
use serde_json::json;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::filter::Filter;
use tenor_core::models::transaction::{
    LoanBooking, LoanTransaction, TRANSACTION_FIELDS, TRANSACTION_SEARCH,
};
use tenor_core::repository::{PageMeta, PaginatedResult, Pagination, TransactionRepository};
use tracing::{info, warn};
use uuid::Uuid;

use super::{parse_decimal, parse_uuid};
use crate::error::DbError;
use crate::query::ListSpec;

const TRANSACTION_LIST: ListSpec = ListSpec {
    table: "loan_transaction",
    fields: TRANSACTION_FIELDS,
    search: TRANSACTION_SEARCH,
};

const BOOKING_QUERY: &str = "\
BEGIN TRANSACTION;
CREATE type::record('loan_transaction', $id) SET
    customer_id = $customer_id,
    customer_limit_id = $customer_limit_id,
    asset_name = $asset_name,
    contract_number = $contract_number,
    is_done = false,
    otr = $otr,
    admin_fee = $admin_fee,
    total = $total,
    installment_amount = $installment_amount,
    installment_count = $installment_count,
    total_interest = $total_interest,
    created_at = $created_at,
    updated_at = $created_at;
FOR $installment IN $installments {
    CREATE type::record('transaction_installment', $installment.id) SET
        transaction_id = $id,
        term = $installment.term,
        due_date = <datetime> $installment.due_date,
        payment_at = NONE,
        payment_method = NONE,
        amount = $installment.amount,
        amount_paid = '0',
        created_at = $created_at,
        updated_at = $created_at;
};
FOR $adjustment IN $adjustments {
    LET $updated = (UPDATE type::record('customer_limit', $adjustment.limit_id) SET
        remaining_limit = $adjustment.remaining_limit,
        version += 1,
        updated_at = $created_at
        WHERE version = $adjustment.expected_version);
    IF array::len($updated) = 0 {
        THROW 'stale customer_limit ' + $adjustment.limit_id;
    };
};
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct TransactionRowWithId {
    record_id: String,
    customer_id: String,
    customer_limit_id: String,
    asset_name: String,
    contract_number: String,
    is_done: bool,
    otr: String,
    admin_fee: String,
    total: String,
    installment_amount: String,
    installment_count: u32,
    total_interest: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ContractNumberRow {
    contract_number: String,
}

#[derive(Debug, SurrealValue)]
struct VersionRow {
    version: u64,
}

impl TransactionRowWithId {
    fn try_into_transaction(self) -> Result<LoanTransaction, DbError> {
        Ok(LoanTransaction {
            id: parse_uuid("loan_transaction", &self.record_id)?,
            customer_id: parse_uuid("customer", &self.customer_id)?,
            customer_limit_id: parse_uuid("customer_limit", &self.customer_limit_id)?,
            asset_name: self.asset_name,
            contract_number: self.contract_number,
            is_done: self.is_done,
            otr: parse_decimal("otr", &self.otr)?,
            admin_fee: parse_decimal("admin_fee", &self.admin_fee)?,
            total: parse_decimal("total", &self.total)?,
            installment_amount: parse_decimal("installment_amount", &self.installment_amount)?,
            installment_count: self.installment_count,
            total_interest: parse_decimal("total_interest", &self.total_interest)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the loan transaction repository.
#[derive(Clone)]
pub struct SurrealTransactionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTransactionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_one(
        &self,
        condition: &str,
        bindings: Vec<(&'static str, String)>,
    ) -> Result<Option<LoanTransaction>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM loan_transaction WHERE {condition}"
        );
        let mut builder = self.db.query(&query);
        for binding in bindings {
            builder = builder.bind(binding);
        }
        let mut result = builder.await?;
        let rows: Vec<TransactionRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_transaction())
            .transpose()
    }

    async fn limit_version(&self, limit_id: Uuid) -> Result<Option<u64>, DbError> {
        let mut result = self
            .db
            .query("SELECT version FROM type::record('customer_limit', $id)")
            .bind(("id", limit_id.to_string()))
            .await?;
        let rows: Vec<VersionRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.version))
    }

    /// Map a rolled-back booking onto the rule it broke: a unique index,
    /// a limit bucket written concurrently, or a storage failure.
    async fn booking_failure(&self, booking: &LoanBooking, err: surrealdb::Error) -> DbError {
        let err = DbError::from_statement(err);
        let DbError::Query(message) = err else {
            return err;
        };

        for adjustment in &booking.limit_adjustments {
            match self.limit_version(adjustment.limit_id).await {
                Ok(Some(version)) if version != adjustment.expected_version => {
                    return DbError::Conflict {
                        constraint: format!(
                            "customer_limit {} was modified concurrently",
                            adjustment.limit_id
                        ),
                    };
                }
                Ok(None) => {
                    return DbError::Conflict {
                        constraint: format!("customer_limit {} no longer exists", adjustment.limit_id),
                    };
                }
                _ => {}
            }
        }

        let contract_number = booking.transaction.contract_number.clone();
        if let Ok(Some(_)) = self
            .select_one(
                "contract_number = $contract_number",
                vec![("contract_number", contract_number)],
            )
            .await
        {
            return DbError::Conflict {
                constraint: "idx_transaction_contract_number".into(),
            };
        }

        DbError::Query(message)
    }
}

impl<C: Connection> TransactionRepository for SurrealTransactionRepository<C> {
    async fn book(&self, booking: LoanBooking) -> TenorResult<LoanTransaction> {
        let tx = &booking.transaction;

        let installments: Vec<serde_json::Value> = booking
            .installments
            .iter()
            .map(|i| {
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "term": i.term,
                    "due_date": i.due_date,
                    "amount": i.amount.to_string(),
                })
            })
            .collect();
        let adjustments: Vec<serde_json::Value> = booking
            .limit_adjustments
            .iter()
            .map(|a| {
                json!({
                    "limit_id": a.limit_id.to_string(),
                    "expected_version": a.expected_version,
                    "remaining_limit": a.remaining_limit.to_string(),
                })
            })
            .collect();

        let result = self
            .db
            .query(BOOKING_QUERY)
            .bind(("id", tx.id.to_string()))
            .bind(("customer_id", tx.customer_id.to_string()))
            .bind(("customer_limit_id", tx.customer_limit_id.to_string()))
            .bind(("asset_name", tx.asset_name.clone()))
            .bind(("contract_number", tx.contract_number.clone()))
            .bind(("otr", tx.otr.to_string()))
            .bind(("admin_fee", tx.admin_fee.to_string()))
            .bind(("total", tx.total.to_string()))
            .bind(("installment_amount", tx.installment_amount.to_string()))
            .bind(("installment_count", tx.installment_count))
            .bind(("total_interest", tx.total_interest.to_string()))
            .bind(("created_at", tx.created_at))
            .bind(("installments", serde_json::Value::Array(installments)))
            .bind(("adjustments", serde_json::Value::Array(adjustments)))
            .await
            .map_err(DbError::from)?;

        if let Err(err) = result.check() {
            let err = self.booking_failure(&booking, err).await;
            warn!(
                transaction_id = %tx.id,
                contract_number = %tx.contract_number,
                error = %err,
                "Loan booking rolled back"
            );
            return Err(err.into());
        }

        info!(
            transaction_id = %tx.id,
            customer_id = %tx.customer_id,
            contract_number = %tx.contract_number,
            total = %tx.total,
            "Loan booked"
        );

        self.get_by_id(tx.id).await?.ok_or_else(|| {
            DbError::NotFound {
                entity: "loan_transaction".into(),
                id: tx.id.to_string(),
            }
            .into()
        })
    }

    async fn get_by_id(&self, id: Uuid) -> TenorResult<Option<LoanTransaction>> {
        Ok(self
            .select_one(
                "id = type::record('loan_transaction', $id)",
                vec![("id", id.to_string())],
            )
            .await?)
    }

    async fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> TenorResult<Option<LoanTransaction>> {
        Ok(self
            .select_one(
                "id = type::record('loan_transaction', $id) AND customer_id = $customer_id",
                vec![("id", id.to_string()), ("customer_id", customer_id.to_string())],
            )
            .await?)
    }

    async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<LoanTransaction>> {
        let q = TRANSACTION_LIST.build(&pagination, &filter)?;
        let total = q.total(&self.db).await?;

        let mut result = self
            .db
            .query(&q.select)
            .bind(("filter", q.filter.clone()))
            .bind(("search", q.search.clone()))
            .bind(("limit", q.limit))
            .bind(("offset", q.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TransactionRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_transaction())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            meta: PageMeta::new(&pagination, total),
        })
    }

    async fn latest_contract_number_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TenorResult<Option<String>> {
        let mut result = self
            .db
            .query(
                "SELECT contract_number, created_at FROM loan_transaction \
                 WHERE created_at >= $from AND created_at < $to \
                 ORDER BY created_at DESC, contract_number DESC LIMIT 1",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ContractNumberRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.contract_number))
    }
}
