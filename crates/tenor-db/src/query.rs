//! Rendering of list queries from [`Pagination`] and [`Filter`].
//!
//! Field names are only ever taken from a table's static whitelist.
//! Filter values travel in a single `$filter` object parameter and the
//! search term in `$search`, so no caller-supplied text reaches the
//! query string.

use serde_json::{Map, Value};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tenor_core::filter::{FieldSpec, Filter};
use tenor_core::repository::Pagination;

use crate::error::DbError;

/// Columns every table can be ordered by in addition to its filterable
/// fields.
const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at"];

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Listing rules for one table.
pub(crate) struct ListSpec {
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
    pub search: &'static [&'static str],
}

/// A rendered list query and its parameters.
pub(crate) struct ListQuery {
    pub select: String,
    pub count: String,
    pub filter: Value,
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl ListSpec {
    pub fn build(&self, pagination: &Pagination, filter: &Filter) -> Result<ListQuery, DbError> {
        filter
            .validate(self.fields)
            .map_err(|e| DbError::InvalidQuery(e.to_string()))?;

        let order_by = pagination.order_by.as_str();
        let sortable = TIMESTAMP_COLUMNS.contains(&order_by)
            || self.fields.iter().any(|f| f.name == order_by);
        if !sortable {
            return Err(DbError::InvalidQuery(format!(
                "cannot order {} by '{order_by}'",
                self.table
            )));
        }

        let mut clauses = Vec::new();
        let mut params = Map::new();
        for (i, condition) in filter.conditions().iter().enumerate() {
            let key = format!("c{i}");
            clauses.push(format!(
                "{} {} $filter.{key}",
                condition.field,
                condition.op.as_str()
            ));
            params.insert(key, condition.value.clone());
        }

        let search = pagination
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty() && !self.search.is_empty())
            .map(str::to_lowercase);
        if search.is_some() {
            let any = self
                .search
                .iter()
                .map(|col| format!("string::lowercase({col}) CONTAINS $search"))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({any})"));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        Ok(ListQuery {
            select: format!(
                "SELECT meta::id(id) AS record_id, * FROM {}{} \
                 ORDER BY {} {} LIMIT $limit START $offset",
                self.table,
                where_clause,
                order_by,
                pagination.direction.as_str()
            ),
            count: format!(
                "SELECT count() AS total FROM {}{} GROUP ALL",
                self.table, where_clause
            ),
            filter: Value::Object(params),
            search,
            limit: pagination.limit(),
            offset: pagination.offset(),
        })
    }
}

impl ListQuery {
    pub async fn total<C: Connection>(&self, db: &Surreal<C>) -> Result<u64, DbError> {
        let mut result = db
            .query(&self.count)
            .bind(("filter", self.filter.clone()))
            .bind(("search", self.search.clone()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
