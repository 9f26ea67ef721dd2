//! SurrealDB implementation of [`UserRepository`] for staff accounts.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::filter::Filter;
use tenor_core::models::user::{CreateUser, USER_FIELDS, USER_SEARCH, UpdateUser, User};
use tenor_core::repository::{PageMeta, PaginatedResult, Pagination, UserRepository};
use tracing::info;
use uuid::Uuid;

use super::{hash_password, parse_optional_uuid, parse_uuid};
use crate::error::DbError;
use crate::query::ListSpec;

const USER_LIST: ListSpec = ListSpec {
    table: "staff_user",
    fields: USER_FIELDS,
    search: USER_SEARCH,
};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    password_hash: String,
    is_active: bool,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    is_active: bool,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_at: self.created_at,
            created_by: parse_optional_uuid("created_by", self.created_by)?,
            updated_at: self.updated_at,
            updated_by: parse_optional_uuid("updated_by", self.updated_by)?,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid("staff_user", &self.record_id)?;
        UserRow {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the staff user repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
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
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TenorResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let created_by = input.created_by.map(|u| u.to_string());

        let result = self
            .db
            .query(
                "CREATE type::record('staff_user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, is_active = true, \
                 created_by = $created_by, updated_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("created_by", created_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "staff_user".into(),
            id: id_str,
        })?;

        info!(user_id = %id, "Staff user created");
        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TenorResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('staff_user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.into_user(id))
            .transpose()?)
    }

    async fn get_by_email(&self, email: &str) -> TenorResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM staff_user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_user())
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> TenorResult<User> {
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
        if input.updated_by.is_some() {
            sets.push("updated_by = $updated_by");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('staff_user', $id) SET {}",
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
        if let Some(updated_by) = input.updated_by {
            builder = builder.bind(("updated_by", updated_by.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "staff_user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn delete(&self, id: Uuid) -> TenorResult<()> {
        // Soft-delete: deactivate.
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('staff_user', $id) SET \
                 is_active = false, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "staff_user".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list(&self, pagination: Pagination, filter: Filter) -> TenorResult<PaginatedResult<User>> {
        let q = USER_LIST.build(&pagination, &filter)?;
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

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            meta: PageMeta::new(&pagination, total),
        })
    }
}
