//! Customer limit queries and staff approval.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::filter::Filter;
use tenor_core::models::customer_limit::{CustomerLimit, LimitApproval};
use tenor_core::repository::{
    CustomerLimitRepository, CustomerRepository, PaginatedResult, Pagination,
};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveLimits {
    pub customer_id: Uuid,
    pub limits: Vec<LimitApproval>,
}

pub struct LimitService<L, C> {
    limits: L,
    customers: C,
}

impl<L, C> LimitService<L, C>
where
    L: CustomerLimitRepository,
    C: CustomerRepository,
{
    pub fn new(limits: L, customers: C) -> Self {
        Self { limits, customers }
    }

    /// Buckets of one customer, shortest term first.
    pub async fn list_for_customer(&self, customer_id: Uuid) -> TenorResult<Vec<CustomerLimit>> {
        self.limits.list_by_customer(customer_id).await
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<CustomerLimit>> {
        self.limits.list(pagination, filter).await
    }

    /// Set the approved amount of the given buckets and activate the
    /// customer. All or nothing.
    pub async fn approve(&self, input: ApproveLimits) -> TenorResult<Vec<CustomerLimit>> {
        if input.limits.is_empty() {
            return Err(TenorError::validation("at least one limit is required"));
        }
        let mut seen = HashSet::new();
        for approval in &input.limits {
            if approval.amount < Decimal::ZERO {
                return Err(TenorError::validation(format!(
                    "amount for limit {} must not be negative",
                    approval.limit_id
                )));
            }
            if !seen.insert(approval.limit_id) {
                return Err(TenorError::validation(format!(
                    "limit {} is listed more than once",
                    approval.limit_id
                )));
            }
        }

        self.customers
            .get_by_id(input.customer_id)
            .await?
            .ok_or_else(|| TenorError::not_found("customer", input.customer_id))?;

        let limits = self.limits.approve(input.customer_id, input.limits).await?;
        info!(customer_id = %input.customer_id, "Customer approved");
        Ok(limits)
    }
}
