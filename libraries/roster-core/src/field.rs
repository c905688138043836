//! Field registry
//!
//! Every place that names a user attribute by string (filters, projections,
//! sorting, SQL rendering) goes through [`UserField`]. Unknown names are
//! rejected here with [`RosterError::InvalidField`], so a client can never
//! probe columns that are not part of the public model.

use crate::error::RosterError;
use crate::types::User;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A publicly addressable user attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Name,
    Email,
    Age,
    CreatedAt,
    UpdatedAt,
}

/// Value domain of a field, deciding which operators apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Timestamp,
}

/// Borrowed value of a field on a particular user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Null,
    Integer(i64),
    Text(&'a str),
    Timestamp(DateTime<Utc>),
}

impl UserField {
    /// All fields in canonical output order
    pub const ALL: [UserField; 6] = [
        UserField::Id,
        UserField::Name,
        UserField::Email,
        UserField::Age,
        UserField::CreatedAt,
        UserField::UpdatedAt,
    ];

    /// Public name, also the storage column name
    pub fn name(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Age => "age",
            UserField::CreatedAt => "created_at",
            UserField::UpdatedAt => "updated_at",
        }
    }

    /// Storage column for this field
    pub fn column(self) -> &'static str {
        self.name()
    }

    pub fn kind(self) -> FieldKind {
        match self {
            UserField::Id | UserField::Age => FieldKind::Integer,
            UserField::Name | UserField::Email => FieldKind::Text,
            UserField::CreatedAt | UserField::UpdatedAt => FieldKind::Timestamp,
        }
    }

    /// Whether the field may hold no value
    pub fn is_nullable(self) -> bool {
        matches!(self, UserField::Age)
    }

    /// Read this field from a user
    pub fn value(self, user: &User) -> FieldValue<'_> {
        match self {
            UserField::Id => FieldValue::Integer(user.id.get()),
            UserField::Name => FieldValue::Text(&user.name),
            UserField::Email => FieldValue::Text(&user.email),
            UserField::Age => user
                .age
                .map_or(FieldValue::Null, |age| FieldValue::Integer(i64::from(age))),
            UserField::CreatedAt => FieldValue::Timestamp(user.created_at),
            UserField::UpdatedAt => FieldValue::Timestamp(user.updated_at),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| RosterError::invalid_field(s))
    }
}

impl FieldValue<'_> {
    /// Render the value as a string, used when comparing mismatched kinds
    pub fn render(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Text(s) => (*s).to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}
