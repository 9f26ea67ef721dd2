//! Read side of booked loans.

use futures::future::join_all;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::filter::Filter;
use tenor_core::models::transaction::{
    LoanTransaction, TransactionDetail, TransactionWithInstallments,
};
use tenor_core::repository::{
    CustomerRepository, InstallmentRepository, PaginatedResult, Pagination,
    TransactionRepository,
};
use uuid::Uuid;

pub struct TransactionLedger<C, T, I> {
    customers: C,
    transactions: T,
    installments: I,
}

impl<C, T, I> TransactionLedger<C, T, I>
where
    C: CustomerRepository,
    T: TransactionRepository,
    I: InstallmentRepository,
{
    pub fn new(customers: C, transactions: T, installments: I) -> Self {
        Self {
            customers,
            transactions,
            installments,
        }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<LoanTransaction>> {
        self.transactions.list(pagination, filter).await
    }

    /// A customer's own transactions; any `customer_id` condition the
    /// caller passed is overridden.
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<LoanTransaction>> {
        let filter = filter
            .conditions()
            .iter()
            .filter(|c| c.field != "customer_id")
            .fold(Filter::new(), |f, c| f.and(c.field.clone(), c.op, c.value.clone()))
            .eq_id("customer_id", customer_id);
        self.transactions.list(pagination, filter).await
    }

    pub async fn get(&self, id: Uuid) -> TenorResult<TransactionWithInstallments> {
        let transaction = self
            .transactions
            .get_by_id(id)
            .await?
            .ok_or_else(|| TenorError::not_found("loan_transaction", id))?;
        self.with_installments(transaction).await
    }

    pub async fn get_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> TenorResult<TransactionWithInstallments> {
        let transaction = self
            .transactions
            .get_for_customer(customer_id, id)
            .await?
            .ok_or_else(|| TenorError::not_found("loan_transaction", id))?;
        self.with_installments(transaction).await
    }

    /// One page of transactions, each joined with its customer and
    /// installments. Rows are fetched concurrently; the first failure in
    /// page order is returned.
    pub async fn details(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<TransactionDetail>> {
        let PaginatedResult { items, meta } = self.transactions.list(pagination, filter).await?;
        let rows = join_all(items.into_iter().map(|t| self.detail(t))).await;
        Ok(PaginatedResult {
            items: rows.into_iter().collect::<TenorResult<Vec<_>>>()?,
            meta,
        })
    }

    async fn detail(&self, transaction: LoanTransaction) -> TenorResult<TransactionDetail> {
        let (customer, installments) = futures::try_join!(
            self.customers.get_by_id(transaction.customer_id),
            self.installments.list_by_transaction(transaction.id),
        )?;
        let customer =
            customer.ok_or_else(|| TenorError::not_found("customer", transaction.customer_id))?;
        Ok(TransactionDetail {
            transaction,
            customer,
            installments,
        })
    }

    async fn with_installments(
        &self,
        transaction: LoanTransaction,
    ) -> TenorResult<TransactionWithInstallments> {
        let installments = self.installments.list_by_transaction(transaction.id).await?;
        Ok(TransactionWithInstallments {
            transaction,
            installments,
        })
    }
}
