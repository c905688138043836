//! Query translator
//!
//! A [`QueryRequest`] is the loosely typed JSON body clients send. Parsing
//! turns it into a [`UserQuery`] whose fields, operators and operands have
//! all been checked against the field registry. Backends then either
//! render the query to SQL or run it through [`engine::run`].

pub mod engine;
mod request;

pub use request::{QueryRequest, SortRequest};

use crate::field::{FieldValue, UserField};
use crate::pagination::DEFAULT_QUERY_LIMIT;
use crate::types::User;
use chrono::{DateTime, Utc};

/// Typed operand of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// A single comparison against one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact match (case-insensitive for `email`)
    Equals(Scalar),

    /// Case-insensitive substring, text fields only
    Contains(String),

    /// Strictly greater, integer and timestamp fields only
    Gt(Scalar),

    /// Strictly less, integer and timestamp fields only
    Lt(Scalar),
}

/// A validated where-clause entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: UserField,
    pub op: FilterOp,
}

impl Filter {
    pub fn new(field: UserField, op: FilterOp) -> Self {
        Self { field, op }
    }

    /// Check whether `user` satisfies this filter; null never matches
    pub fn matches(&self, user: &User) -> bool {
        let value = self.field.value(user);
        match (&self.op, value) {
            (_, FieldValue::Null) => false,
            (FilterOp::Equals(Scalar::Text(expected)), FieldValue::Text(actual)) => {
                if self.field == UserField::Email {
                    actual.to_lowercase() == expected.to_lowercase()
                } else {
                    actual == expected
                }
            }
            (FilterOp::Equals(Scalar::Integer(expected)), FieldValue::Integer(actual)) => {
                actual == *expected
            }
            (FilterOp::Equals(Scalar::Timestamp(expected)), FieldValue::Timestamp(actual)) => {
                actual == *expected
            }
            (FilterOp::Contains(needle), FieldValue::Text(actual)) => actual
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            (FilterOp::Gt(Scalar::Integer(bound)), FieldValue::Integer(actual)) => actual > *bound,
            (FilterOp::Gt(Scalar::Timestamp(bound)), FieldValue::Timestamp(actual)) => {
                actual > *bound
            }
            (FilterOp::Lt(Scalar::Integer(bound)), FieldValue::Integer(actual)) => actual < *bound,
            (FilterOp::Lt(Scalar::Timestamp(bound)), FieldValue::Timestamp(actual)) => {
                actual < *bound
            }
            _ => false,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// `desc` in any case is descending, anything else ascending
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some(dir) if dir.trim().eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: UserField,
    pub direction: Direction,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: UserField::Id,
            direction: Direction::Asc,
        }
    }
}

/// A fully validated query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Conditions combined with AND
    pub filters: Vec<Filter>,

    /// Fields to return, in order; empty means all
    pub select: Vec<UserField>,

    pub sort: Sort,

    pub limit: usize,

    pub offset: usize,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            select: Vec::new(),
            sort: Sort::default(),
            limit: DEFAULT_QUERY_LIMIT,
            offset: 0,
        }
    }
}
