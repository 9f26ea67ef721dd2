//! Staff-side customer administration.

use futures::future::try_join_all;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::filter::Filter;
use tenor_core::models::customer::{Customer, CustomerProfile, UpdateCustomer};
use tenor_core::models::normalize_email;
use tenor_core::repository::{
    CustomerInformationFileRepository, CustomerRepository, PaginatedResult, Pagination,
};
use tracing::info;
use uuid::Uuid;

use crate::credentials::{PasswordRules, check_email, require};

pub struct CustomerAdmin<R, F> {
    customers: R,
    information: F,
    passwords: PasswordRules,
}

impl<R, F> CustomerAdmin<R, F>
where
    R: CustomerRepository,
    F: CustomerInformationFileRepository,
{
    pub fn new(customers: R, information: F, passwords: PasswordRules) -> Self {
        Self {
            customers,
            information,
            passwords,
        }
    }

    pub async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<Customer>> {
        self.customers.list(pagination, filter).await
    }

    /// Like [`list`](Self::list), with each customer's information file.
    pub async fn list_with_information(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<CustomerProfile>> {
        let page = self.customers.list(pagination, filter).await?;
        let files = try_join_all(
            page.items
                .iter()
                .map(|c| self.information.get_by_customer(c.id)),
        )
        .await?;
        let profiles = page
            .items
            .iter()
            .cloned()
            .zip(files)
            .map(|(customer, information)| CustomerProfile {
                customer,
                information,
            })
            .collect();
        Ok(page.with_items(profiles))
    }

    pub async fn get(&self, id: Uuid) -> TenorResult<CustomerProfile> {
        let customer = self
            .customers
            .get_by_id(id)
            .await?
            .ok_or_else(|| TenorError::not_found("customer", id))?;
        let information = self.information.get_by_customer(id).await?;
        Ok(CustomerProfile {
            customer,
            information,
        })
    }

    pub async fn update(&self, id: Uuid, input: UpdateCustomer) -> TenorResult<Customer> {
        if let Some(name) = &input.name {
            require("name", name)?;
        }
        let mut input = input;
        if let Some(email) = input.email.as_mut() {
            check_email(email)?;
            *email = normalize_email(email);
        }
        if let Some(password) = &input.password {
            self.passwords.check_new(password)?;
        }
        let customer = self.customers.update(id, input).await?;
        info!(customer_id = %id, "Customer updated by staff");
        Ok(customer)
    }

    /// Soft delete: the customer is deactivated.
    pub async fn delete(&self, id: Uuid) -> TenorResult<()> {
        self.customers.delete(id).await?;
        info!(customer_id = %id, "Customer deactivated");
        Ok(())
    }

    /// Deactivate several customers, stopping at the first unknown id.
    pub async fn delete_many(&self, ids: &[Uuid]) -> TenorResult<()> {
        if ids.is_empty() {
            return Err(TenorError::validation("at least one id is required"));
        }
        for id in ids {
            self.delete(*id).await?;
        }
        Ok(())
    }
}
