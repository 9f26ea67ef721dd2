//! SurrealDB implementation of [`VariableGlobalRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::error::TenorResult;
use tenor_core::models::variable_global::{CreateVariableGlobal, VariableGlobal};
use tenor_core::repository::VariableGlobalRepository;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct VariableRow {
    code: String,
    value: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct VariableRowWithId {
    record_id: String,
    code: String,
    value: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VariableRow {
    fn into_variable(self, id: Uuid) -> VariableGlobal {
        VariableGlobal {
            id,
            code: self.code,
            value: self.value,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the global variable repository.
#[derive(Clone)]
pub struct SurrealVariableGlobalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealVariableGlobalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> VariableGlobalRepository for SurrealVariableGlobalRepository<C> {
    async fn create(&self, input: CreateVariableGlobal) -> TenorResult<VariableGlobal> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('variable_global', $id) SET \
                 code = $code, value = $value, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("value", input.value))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<VariableRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "variable_global".into(),
            id: id_str,
        })?;

        Ok(row.into_variable(id))
    }

    async fn get_by_code(&self, code: &str) -> TenorResult<Option<VariableGlobal>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM variable_global \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VariableRowWithId> = result.take(0).map_err(DbError::from)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let id = parse_uuid("variable_global", &row.record_id)?;
        Ok(Some(
            VariableRow {
                code: row.code,
                value: row.value,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }
            .into_variable(id),
        ))
    }
}
