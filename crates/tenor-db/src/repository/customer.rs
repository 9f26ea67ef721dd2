//! SurrealDB implementation of [`CustomerRepository`].

use chrono::{DateTime, Utc};
use serde_json::json;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::filter::Filter;
use tenor_core::models::customer::{
    CUSTOMER_FIELDS, CUSTOMER_SEARCH, Customer, CustomerRegistration, RegisteredCustomer,
    UpdateCustomer,
};
use tenor_core::repository::{
    CustomerInformationFileRepository, CustomerLimitRepository, CustomerRepository, PageMeta,
    PaginatedResult, Pagination,
};
use tracing::info;
use uuid::Uuid;

use super::{
    SurrealCustomerInformationFileRepository, SurrealCustomerLimitRepository, hash_password,
    parse_uuid,
};
use crate::error::DbError;
use crate::query::ListSpec;

const CUSTOMER_LIST: ListSpec = ListSpec {
    table: "customer",
    fields: CUSTOMER_FIELDS,
    search: CUSTOMER_SEARCH,
};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CustomerRow {
    name: String,
    email: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CustomerRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self, id: Uuid) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl CustomerRowWithId {
    fn try_into_customer(self) -> Result<Customer, DbError> {
        let id = parse_uuid("customer", &self.record_id)?;
        Ok(CustomerRow {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_customer(id))
    }
}

/// SurrealDB implementation of the Customer repository.
#[derive(Clone)]
pub struct SurrealCustomerRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealCustomerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    /// Hash with `pepper` when set.
    pub fn peppered(db: Surreal<C>, pepper: Option<String>) -> Self {
        Self { db, pepper }
    }

    /// Work out which uniqueness rule a failed registration tripped.
    async fn registration_conflict(&self, input: &CustomerRegistration) -> Option<DbError> {
        let conflict = |constraint: &str| DbError::Conflict {
            constraint: constraint.into(),
        };
        if let Ok(Some(_)) = self.get_by_email(&input.email).await {
            return Some(conflict("idx_customer_email"));
        }
        let cifs = SurrealCustomerInformationFileRepository::new(self.db.clone());
        if let Ok(Some(_)) = cifs.get_by_nik(&input.information.nik).await {
            return Some(conflict("idx_cif_nik"));
        }
        if let Ok(true) = cifs.cif_number_exists(&input.information.cif_number).await {
            return Some(conflict("idx_cif_number"));
        }
        None
    }
}

impl<C: Connection> CustomerRepository for SurrealCustomerRepository<C> {
    async fn register(&self, input: CustomerRegistration) -> TenorResult<RegisteredCustomer> {
        let customer_id = Uuid::new_v4();
        let cif_id = Uuid::new_v4();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let limits: Vec<serde_json::Value> = input
            .limit_terms
            .iter()
            .map(|term| json!({ "id": Uuid::new_v4().to_string(), "term": term }))
            .collect();
        let info = &input.information;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('customer', $customer_id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, is_active = false; \
                 CREATE type::record('customer_information_file', $cif_id) SET \
                 customer_id = $customer_id, cif_number = $cif_number, \
                 nik = $nik, full_name = $full_name, \
                 legal_name = $legal_name, place_of_birth = $place_of_birth, \
                 date_of_birth = $date_of_birth, gender = $gender, \
                 salary = $salary, card_photo = $card_photo, \
                 selfie_photo = $selfie_photo; \
                 FOR $limit IN $limits { \
                     CREATE type::record('customer_limit', $limit.id) SET \
                     customer_id = $customer_id, term = $limit.term, \
                     is_active = false, amount_limit = '0', \
                     remaining_limit = '0', version = 0; \
                 }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("customer_id", customer_id.to_string()))
            .bind(("cif_id", cif_id.to_string()))
            .bind(("name", input.name.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", password_hash))
            .bind(("cif_number", info.cif_number.clone()))
            .bind(("nik", info.nik.clone()))
            .bind(("full_name", info.full_name.clone()))
            .bind(("legal_name", info.legal_name.clone()))
            .bind(("place_of_birth", info.place_of_birth.clone()))
            .bind(("date_of_birth", info.date_of_birth.to_string()))
            .bind(("gender", info.gender.clone()))
            .bind(("salary", info.salary.to_string()))
            .bind(("card_photo", info.card_photo.clone()))
            .bind(("selfie_photo", info.selfie_photo.clone()))
            .bind(("limits", serde_json::Value::Array(limits)))
            .await
            .map_err(DbError::from)?;

        if let Err(err) = result.check() {
            let err = match DbError::from_statement(err) {
                DbError::Query(message) => self
                    .registration_conflict(&input)
                    .await
                    .unwrap_or(DbError::Query(message)),
                classified => classified,
            };
            return Err(err.into());
        }

        let customer = self
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "customer".into(),
                id: customer_id.to_string(),
            })?;
        let information = SurrealCustomerInformationFileRepository::new(self.db.clone())
            .get_by_customer(customer_id)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "customer_information_file".into(),
                id: customer_id.to_string(),
            })?;
        let limits = SurrealCustomerLimitRepository::new(self.db.clone())
            .list_by_customer(customer_id)
            .await?;

        info!(customer_id = %customer_id, buckets = limits.len(), "Customer registered");

        Ok(RegisteredCustomer {
            customer,
            information,
            limits,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> TenorResult<Option<Customer>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('customer', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_customer(id)))
    }

    async fn get_by_email(&self, email: &str) -> TenorResult<Option<Customer>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM customer \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_customer())
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCustomer) -> TenorResult<Customer> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.password.is_some() {
            sets.push("password_hash = $password_hash");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('customer', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(password) = input.password {
            let hash = hash_password(&password, self.pepper.as_deref())?;
            builder = builder.bind(("password_hash", hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "customer".into(),
            id: id_str,
        })?;

        Ok(row.into_customer(id))
    }

    async fn delete(&self, id: Uuid) -> TenorResult<()> {
        // Soft-delete: deactivate.
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('customer', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CustomerRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "customer".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list(
        &self,
        pagination: Pagination,
        filter: Filter,
    ) -> TenorResult<PaginatedResult<Customer>> {
        let q = CUSTOMER_LIST.build(&pagination, &filter)?;
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

        let rows: Vec<CustomerRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_customer())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            meta: PageMeta::new(&pagination, total),
        })
    }
}
