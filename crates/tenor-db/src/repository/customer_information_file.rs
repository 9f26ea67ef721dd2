//! SurrealDB implementation of [`CustomerInformationFileRepository`].

use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::models::customer_information_file::{
    CustomerInformationFile, UpdateCustomerInformationFile,
};
use tenor_core::repository::CustomerInformationFileRepository;
use uuid::Uuid;

use super::{parse_decimal, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CifRowWithId {
    record_id: String,
    customer_id: String,
    cif_number: String,
    nik: String,
    full_name: String,
    legal_name: String,
    place_of_birth: String,
    date_of_birth: String,
    gender: Option<String>,
    salary: String,
    card_photo: String,
    selfie_photo: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CifNumberRow {
    cif_number: String,
}

impl CifRowWithId {
    fn try_into_cif(self) -> Result<CustomerInformationFile, DbError> {
        let date_of_birth = self
            .date_of_birth
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Decode(format!("invalid date_of_birth: {e}")))?;
        Ok(CustomerInformationFile {
            id: parse_uuid("customer_information_file", &self.record_id)?,
            customer_id: parse_uuid("customer", &self.customer_id)?,
            cif_number: self.cif_number,
            nik: self.nik,
            full_name: self.full_name,
            legal_name: self.legal_name,
            place_of_birth: self.place_of_birth,
            date_of_birth,
            gender: self.gender,
            salary: parse_decimal("salary", &self.salary)?,
            card_photo: self.card_photo,
            selfie_photo: self.selfie_photo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the customer information file repository.
#[derive(Clone)]
pub struct SurrealCustomerInformationFileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCustomerInformationFileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_one(
        &self,
        condition: &str,
        value: String,
    ) -> Result<Option<CustomerInformationFile>, DbError> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM customer_information_file \
             WHERE {condition} = $value"
        );
        let mut result = self.db.query(&query).bind(("value", value)).await?;
        let rows: Vec<CifRowWithId> = result.take(0)?;
        rows.into_iter().next().map(|row| row.try_into_cif()).transpose()
    }

    pub(crate) async fn cif_number_exists(&self, cif_number: &str) -> Result<bool, DbError> {
        Ok(self
            .select_one("cif_number", cif_number.to_string())
            .await?
            .is_some())
    }
}

impl<C: Connection> CustomerInformationFileRepository
    for SurrealCustomerInformationFileRepository<C>
{
    async fn get_by_customer(
        &self,
        customer_id: Uuid,
    ) -> TenorResult<Option<CustomerInformationFile>> {
        Ok(self
            .select_one("customer_id", customer_id.to_string())
            .await?)
    }

    async fn get_by_nik(&self, nik: &str) -> TenorResult<Option<CustomerInformationFile>> {
        Ok(self.select_one("nik", nik.to_string()).await?)
    }

    async fn update_by_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInformationFile,
    ) -> TenorResult<CustomerInformationFile> {
        let customer_id_str = customer_id.to_string();

        let mut sets = Vec::new();
        if input.full_name.is_some() {
            sets.push("full_name = $full_name");
        }
        if input.legal_name.is_some() {
            sets.push("legal_name = $legal_name");
        }
        if input.place_of_birth.is_some() {
            sets.push("place_of_birth = $place_of_birth");
        }
        if input.date_of_birth.is_some() {
            sets.push("date_of_birth = $date_of_birth");
        }
        if input.gender.is_some() {
            sets.push("gender = $gender");
        }
        if input.salary.is_some() {
            sets.push("salary = $salary");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE customer_information_file SET {} \
             WHERE customer_id = $customer_id; \
             SELECT meta::id(id) AS record_id, * FROM customer_information_file \
             WHERE customer_id = $customer_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("customer_id", customer_id_str.clone()));
        if let Some(full_name) = input.full_name {
            builder = builder.bind(("full_name", full_name));
        }
        if let Some(legal_name) = input.legal_name {
            builder = builder.bind(("legal_name", legal_name));
        }
        if let Some(place_of_birth) = input.place_of_birth {
            builder = builder.bind(("place_of_birth", place_of_birth));
        }
        if let Some(date_of_birth) = input.date_of_birth {
            builder = builder.bind(("date_of_birth", date_of_birth.to_string()));
        }
        if let Some(gender) = input.gender {
            // gender is Option<Option<String>>: Some(None) clears it
            builder = builder.bind(("gender", gender));
        }
        if let Some(salary) = input.salary {
            builder = builder.bind(("salary", salary.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<CifRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer_information_file".into(),
            id: customer_id_str,
        })?;

        Ok(row.try_into_cif()?)
    }

    async fn latest_cif_number_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TenorResult<Option<String>> {
        let mut result = self
            .db
            .query(
                "SELECT cif_number, created_at FROM customer_information_file \
                 WHERE created_at >= $from AND created_at < $to \
                 ORDER BY created_at DESC, cif_number DESC LIMIT 1",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CifNumberRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.cif_number))
    }
}
