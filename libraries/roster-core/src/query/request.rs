//! Parsing of the client-facing query body

use super::{Direction, Filter, FilterOp, Scalar, Sort, UserQuery};
use crate::error::{Result, RosterError};
use crate::field::{FieldKind, UserField};
use crate::pagination::{clamp_limit, coerce_integer, DEFAULT_QUERY_LIMIT};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw query body: `{ where?, select?, sort?, limit?, offset? }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default, rename = "where")]
    pub filter: Option<Value>,

    #[serde(default)]
    pub select: Option<Vec<String>>,

    #[serde(default)]
    pub sort: Option<SortRequest>,

    #[serde(default)]
    pub limit: Option<Value>,

    #[serde(default)]
    pub offset: Option<Value>,
}

/// Raw sort specification
#[derive(Debug, Clone, Deserialize)]
pub struct SortRequest {
    pub field: String,

    #[serde(default)]
    pub direction: Option<String>,
}

impl QueryRequest {
    /// Validate the request against the field registry
    ///
    /// # Errors
    ///
    /// [`RosterError::InvalidField`] for an unknown field anywhere in the
    /// request, [`RosterError::InvalidFilter`] for a malformed where clause.
    /// Limit and offset never fail; bad values fall back to defaults.
    pub fn parse(&self) -> Result<UserQuery> {
        let filters = match &self.filter {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(clauses)) => parse_where(clauses)?,
            Some(_) => return Err(RosterError::invalid_filter("where must be an object")),
        };

        let mut select = Vec::new();
        for name in self.select.iter().flatten() {
            let field: UserField = name.parse()?;
            if !select.contains(&field) {
                select.push(field);
            }
        }

        let sort = match &self.sort {
            Some(sort) => Sort {
                field: sort.field.parse()?,
                direction: Direction::parse_lenient(sort.direction.as_deref()),
            },
            None => Sort::default(),
        };

        let limit = clamp_limit(coerce_integer(self.limit.as_ref()), DEFAULT_QUERY_LIMIT);
        let offset = coerce_integer(self.offset.as_ref())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);

        Ok(UserQuery {
            filters,
            select,
            sort,
            limit,
            offset,
        })
    }
}

fn parse_where(clauses: &Map<String, Value>) -> Result<Vec<Filter>> {
    let mut filters = Vec::new();

    for (name, operators) in clauses {
        let field: UserField = name.parse()?;
        let Value::Object(operators) = operators else {
            return Err(RosterError::invalid_filter(format!(
                "{field}: expected an operator object"
            )));
        };
        if operators.is_empty() {
            return Err(RosterError::invalid_filter(format!(
                "{field}: no operator given"
            )));
        }

        for (op, operand) in operators {
            filters.push(Filter::new(field, parse_op(field, op, operand)?));
        }
    }

    Ok(filters)
}

fn parse_op(field: UserField, op: &str, operand: &Value) -> Result<FilterOp> {
    match (op, field.kind()) {
        ("equals", _) => Ok(FilterOp::Equals(parse_scalar(field, operand)?)),
        ("contains", FieldKind::Text) => match operand {
            Value::String(needle) => Ok(FilterOp::Contains(needle.clone())),
            _ => Err(wrong_type(field, op, "a string")),
        },
        ("gt" | "lt", FieldKind::Integer | FieldKind::Timestamp) => {
            let bound = parse_scalar(field, operand)?;
            Ok(if op == "gt" {
                FilterOp::Gt(bound)
            } else {
                FilterOp::Lt(bound)
            })
        }
        ("contains" | "gt" | "lt", _) => Err(RosterError::invalid_filter(format!(
            "{field}: operator '{op}' does not apply to this field"
        ))),
        _ => Err(RosterError::invalid_filter(format!(
            "{field}: unknown operator '{op}'"
        ))),
    }
}

fn parse_scalar(field: UserField, operand: &Value) -> Result<Scalar> {
    match field.kind() {
        FieldKind::Integer => coerce_integer(Some(operand))
            .map(Scalar::Integer)
            .ok_or_else(|| wrong_type(field, "value", "an integer")),
        FieldKind::Text => match operand {
            Value::String(text) => Ok(Scalar::Text(text.clone())),
            _ => Err(wrong_type(field, "value", "a string")),
        },
        FieldKind::Timestamp => operand
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| Scalar::Timestamp(ts.with_timezone(&Utc)))
            .ok_or_else(|| wrong_type(field, "value", "an RFC 3339 timestamp")),
    }
}

fn wrong_type(field: UserField, what: &str, expected: &str) -> RosterError {
    RosterError::invalid_filter(format!("{field}: {what} must be {expected}"))
}
