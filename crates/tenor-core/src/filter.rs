//! Structured list predicates.
//!
//! A [`Filter`] is a conjunction of `(field, op, value)` conditions.
//! Field names are checked against the entity's [`FieldSpec`] whitelist
//! and values are carried as JSON so the storage layer can bind them as
//! query parameters.

use serde_json::Value;
use uuid::Uuid;

use crate::error::{TenorError, TenorResult};

/// Query-string keys that belong to pagination, never to a filter.
pub const PAGINATION_KEYS: &[&str] = &["page", "limit", "sort", "order", "query", "get_all_data"];

/// How a filterable field's value is parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Uuid,
    Integer,
    Boolean,
}

/// A whitelisted, filterable column.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "eq" => Some(Op::Eq),
            "ne" => Some(Op::Ne),
            "gt" => Some(Op::Gt),
            "gte" => Some(Op::Gte),
            "lt" => Some(Op::Lt),
            "lte" => Some(Op::Lte),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(field, Op::Eq, value)
    }

    /// Equality on a UUID column (UUIDs are compared in string form).
    pub fn eq_id(self, field: impl Into<String>, id: Uuid) -> Self {
        self.and(field, Op::Eq, id.to_string())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Reject any condition on a field outside `fields`.
    pub fn validate(&self, fields: &[FieldSpec]) -> TenorResult<()> {
        for condition in &self.conditions {
            if !fields.iter().any(|f| f.name == condition.field) {
                return Err(TenorError::validation(format!(
                    "field '{}' cannot be filtered",
                    condition.field
                )));
            }
        }
        Ok(())
    }

    /// Build a filter from query-string pairs.
    ///
    /// `field=value` is an equality; `field__gte=value` (and `ne`, `gt`,
    /// `lt`, `lte`) selects another operator. Pagination keys, empty
    /// values and unknown fields are ignored. A value that does not parse
    /// as the field's kind is a validation error.
    pub fn from_query_params<'a, I>(params: I, fields: &[FieldSpec]) -> TenorResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Filter::new();
        for (key, raw) in params {
            if raw.is_empty() || PAGINATION_KEYS.contains(&key) {
                continue;
            }
            let (name, op) = match key.rsplit_once("__") {
                Some((name, suffix)) => match Op::from_suffix(suffix) {
                    Some(op) => (name, op),
                    None => continue,
                },
                None => (key, Op::Eq),
            };
            let Some(spec) = fields.iter().find(|f| f.name == name) else {
                continue;
            };
            let value = parse_value(spec, raw)?;
            filter = filter.and(name, op, value);
        }
        Ok(filter)
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> TenorResult<Value> {
    let invalid = || TenorError::validation(format!("invalid value '{raw}' for '{}'", spec.name));
    match spec.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        FieldKind::Uuid => Uuid::parse_str(raw)
            .map(|id| Value::String(id.to_string()))
            .map_err(|_| invalid()),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        FieldKind::Boolean => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid()),
    }
}
