//! SurrealDB implementation of [`CustomerLimitRepository`].

use chrono::{DateTime, Utc};
use serde_json::json;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::filter::Filter;
use tenor_core::models::customer_limit::{CUSTOMER_LIMIT_FIELDS, CustomerLimit, LimitApproval};
use tenor_core::repository::{CustomerLimitRepository, PageMeta, PaginatedResult, Pagination};
use tracing::info;
use uuid::Uuid;

use super::{parse_decimal, parse_uuid};
use crate::error::DbError;
use crate::query::ListSpec;

const CUSTOMER_LIMIT_LIST: ListSpec = ListSpec {
    table: "customer_limit",
    fields: CUSTOMER_LIMIT_FIELDS,
    search: &[],
};

#[derive(Debug, SurrealValue)]
struct LimitRowWithId {
    record_id: String,
    customer_id: String,
    term: u32,
    is_active: bool,
    amount_limit: String,
    remaining_limit: String,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LimitRowWithId {
    fn try_into_limit(self) -> Result<CustomerLimit, DbError> {
        Ok(CustomerLimit {
            id: parse_uuid("customer_limit", &self.record_id)?,
            customer_id: parse_uuid("customer", &self.customer_id)?,
            term: self.term,
            is_active: self.is_active,
            amount_limit: parse_decimal("amount_limit", &self.amount_limit)?,
            remaining_limit: parse_decimal("remaining_limit", &self.remaining_limit)?,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_limits(rows: Vec<LimitRowWithId>) -> Result<Vec<CustomerLimit>, DbError> {
    rows.into_iter().map(|row| row.try_into_limit()).collect()
}

/// SurrealDB implementation of the customer limit repository.
#[derive(Clone)]
pub struct SurrealCustomerLimitRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCustomerLimitRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CustomerLimitRepository for SurrealCustomerLimitRepository<C> {
    async fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> TenorResult<Option<CustomerLimit>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('customer_limit', $id) \
                 WHERE customer_id = $customer_id",
            )
            .bind(("id", id.to_string()))
            .bind(("customer_id", customer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LimitRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_limit())
            .transpose()?)
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> TenorResult<Vec<CustomerLimit>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer_limit \
                 WHERE customer_id = $customer_id ORDER BY term ASC",
            )
            .bind(("customer_id", customer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LimitRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_limits(rows)?)
    }

    async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<CustomerLimit>> {
        let q = CUSTOMER_LIMIT_LIST.build(&pagination, &filter)?;
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

        let rows: Vec<LimitRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(PaginatedResult {
            items: into_limits(rows)?,
            meta: PageMeta::new(&pagination, total),
        })
    }

    async fn approve(
        &self,
        customer_id: Uuid,
        approvals: Vec<LimitApproval>,
    ) -> TenorResult<Vec<CustomerLimit>> {
        let payload: Vec<serde_json::Value> = approvals
            .iter()
            .map(|a| json!({ "limit_id": a.limit_id.to_string(), "amount": a.amount.to_string() }))
            .collect();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 FOR $approval IN $approvals { \
                     LET $updated = (UPDATE type::record('customer_limit', $approval.limit_id) SET \
                         amount_limit = $approval.amount, \
                         remaining_limit = $approval.amount, \
                         is_active = true, version += 1, \
                         updated_at = time::now() \
                         WHERE customer_id = $customer_id); \
                     IF array::len($updated) = 0 { \
                         THROW 'customer_limit ' + $approval.limit_id + ' does not belong to customer'; \
                     }; \
                 }; \
                 UPDATE type::record('customer', $customer_id) SET \
                 is_active = true, updated_at = time::now(); \
                 COMMIT TRANSACTION;",
            )
            .bind(("customer_id", customer_id.to_string()))
            .bind(("approvals", serde_json::Value::Array(payload)))
            .await
            .map_err(DbError::from)?;

        if let Err(err) = result.check() {
            for approval in &approvals {
                if let Ok(None) = self.get_for_customer(customer_id, approval.limit_id).await {
                    return Err(DbError::NotFound {
                        entity: "customer_limit".into(),
                        id: approval.limit_id.to_string(),
                    }
                    .into());
                }
            }
            return Err(DbError::from_statement(err).into());
        }

        info!(
            customer_id = %customer_id,
            buckets = approvals.len(),
            "Customer limits approved"
        );

        self.list_by_customer(customer_id).await
    }
}
