//! Customer self-service.

use rust_decimal::Decimal;
use tenor_core::error::{TenorError, TenorResult};
use tenor_core::models::customer::{CustomerProfile, UpdateCustomer};
use tenor_core::models::customer_information_file::{
    CustomerInformationFile, UpdateCustomerInformationFile,
};
use tenor_core::repository::{CustomerInformationFileRepository, CustomerRepository};
use tracing::info;
use uuid::Uuid;

use crate::credentials::{ChangePassword, PasswordRules, require};

pub struct CustomerProfiles<R, F> {
    customers: R,
    information: F,
    passwords: PasswordRules,
}

impl<R, F> CustomerProfiles<R, F>
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

    pub async fn get(&self, customer_id: Uuid) -> TenorResult<CustomerProfile> {
        let customer = self
            .customers
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| TenorError::not_found("customer", customer_id))?;
        let information = self.information.get_by_customer(customer_id).await?;
        Ok(CustomerProfile {
            customer,
            information,
        })
    }

    /// Partial update of the customer's information file. NIK, CIF number
    /// and photos are fixed at sign-up.
    pub async fn update_information(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInformationFile,
    ) -> TenorResult<CustomerInformationFile> {
        for (field, value) in [
            ("full_name", &input.full_name),
            ("legal_name", &input.legal_name),
            ("place_of_birth", &input.place_of_birth),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if input.salary.is_some_and(|s| s <= Decimal::ZERO) {
            return Err(TenorError::validation("salary must be greater than zero"));
        }

        let updated = self
            .information
            .update_by_customer(customer_id, input)
            .await?;
        info!(customer_id = %customer_id, "Customer information updated");
        Ok(updated)
    }

    pub async fn change_password(&self, customer_id: Uuid, input: ChangePassword) -> TenorResult<()> {
        let customer = self
            .customers
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| TenorError::not_found("customer", customer_id))?;
        let password = self.passwords.change(&customer.password_hash, &input)?;

        self.customers
            .update(
                customer_id,
                UpdateCustomer {
                    password: Some(password.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        info!(customer_id = %customer_id, "Customer password changed");
        Ok(())
    }
}
