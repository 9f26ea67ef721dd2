//! Loan origination.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::transaction::{LoanBooking, LoanTransaction, NewLoanTransaction};
use tenor_core::repository::{
    CustomerLimitRepository, TransactionRepository, VariableGlobalRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::allocation::reallocate;
use crate::clock::Clock;
use crate::config::LendingConfig;
use crate::fees::FeeResolver;
use crate::pricing::LoanQuote;
use crate::schedule::build_schedule;
use crate::sequence::DailySequence;

/// Request to draw a loan against one of the customer's limit buckets.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub customer_id: Uuid,
    pub customer_limit_id: Uuid,
    pub asset_name: String,
    pub otr: Decimal,
}

/// Prices, schedules and books loans.
///
/// The transaction row, its installments and the markdown of every
/// limit bucket are written by one atomic booking.
pub struct LoanOriginator<L, T, V, K> {
    limits: L,
    transactions: T,
    fees: FeeResolver<V>,
    clock: K,
    contracts: DailySequence,
}

impl<L, T, V, K> LoanOriginator<L, T, V, K>
where
    L: CustomerLimitRepository,
    T: TransactionRepository,
    V: VariableGlobalRepository,
    K: Clock,
{
    pub fn new(limits: L, transactions: T, variables: V, clock: K, config: &LendingConfig) -> Self {
        Self {
            limits,
            transactions,
            fees: FeeResolver::new(variables, config),
            clock,
            contracts: DailySequence::new(config.contract_prefix.clone()),
        }
    }

    pub async fn create_transaction(&self, input: CreateTransaction) -> TenorResult<LoanTransaction> {
        let asset_name = input.asset_name.trim();
        if asset_name.is_empty() {
            return Err(TenorError::validation("asset_name is required"));
        }
        if input.otr <= Decimal::ZERO {
            return Err(TenorError::validation("otr must be greater than zero"));
        }

        // 1. One snapshot of the customer's buckets. Affordability, the
        // markdown ratios and the versions checked at booking all come
        // from it.
        let buckets = self.limits.list_by_customer(input.customer_id).await?;
        let limit = buckets
            .iter()
            .find(|b| b.id == input.customer_limit_id)
            .ok_or_else(|| TenorError::not_found("customer_limit", input.customer_limit_id))?;

        // 2. Fees.
        let fees = self.fees.resolve().await?;

        // 3. Price and check the targeted bucket.
        let quote = LoanQuote::price(input.otr, limit.term, &fees)?;
        quote.ensure_affordable(limit)?;

        // 4. Contract number.
        let now = self.clock.now();
        let contract_number = self.next_contract_number(now).await;

        // 5. Schedule and markdown of every bucket.
        let installments = build_schedule(now, limit.term, quote.installment_amount)?;
        let limit_adjustments = reallocate(&buckets, limit.remaining_limit, quote.total)?;

        // 6. Book atomically.
        let booking = LoanBooking {
            transaction: NewLoanTransaction {
                id: Uuid::new_v4(),
                customer_id: input.customer_id,
                customer_limit_id: limit.id,
                asset_name: asset_name.to_string(),
                contract_number,
                otr: quote.otr,
                admin_fee: quote.admin_fee,
                total: quote.total,
                installment_amount: quote.installment_amount,
                installment_count: quote.term,
                total_interest: quote.total_interest,
                created_at: now,
            },
            installments,
            limit_adjustments,
        };
        let transaction = self.transactions.book(booking).await?;

        info!(
            transaction_id = %transaction.id,
            customer_id = %transaction.customer_id,
            term = transaction.installment_count,
            "Transaction created"
        );
        Ok(transaction)
    }

    async fn next_contract_number(&self, now: DateTime<Utc>) -> String {
        let (from, to) = DailySequence::day_window(now);
        let latest = self.transactions.latest_contract_number_between(from, to).await;
        self.contracts.next_or_first(latest, now)
    }
}
