//! SQL rendering for searches and validated queries
//!
//! Column names only ever come from [`UserField::column`]; every value is a
//! bound parameter.

use roster_core::field::UserField;
use roster_core::query::{Filter, FilterOp, Scalar, UserQuery};
use roster_core::types::SearchCriteria;
use sqlx::{Postgres, QueryBuilder};

/// Start a `SELECT` over all user columns with an open `WHERE TRUE`
pub fn select_users() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(
        "SELECT id, name, email, age, created_at, updated_at FROM users WHERE TRUE",
    )
}

/// Escape `\`, `%` and `_` and wrap in wildcards for a substring `ILIKE`
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append simple search criteria
pub fn push_criteria(builder: &mut QueryBuilder<'static, Postgres>, criteria: &SearchCriteria) {
    if let Some(email) = &criteria.email {
        builder
            .push(" AND lower(email) = lower(")
            .push_bind(email.clone())
            .push(")");
    }
    if let Some(name) = &criteria.name {
        builder
            .push(" AND name ILIKE ")
            .push_bind(contains_pattern(name))
            .push(r" ESCAPE '\'");
    }
    if let Some(age) = criteria.age {
        builder.push(" AND age = ").push_bind(age);
    }
}

/// Append where-clause filters
pub fn push_filters(builder: &mut QueryBuilder<'static, Postgres>, filters: &[Filter]) {
    for filter in filters {
        let column = filter.field.column();
        match &filter.op {
            FilterOp::Equals(Scalar::Text(text)) if filter.field == UserField::Email => {
                builder
                    .push(" AND lower(email) = lower(")
                    .push_bind(text.clone())
                    .push(")");
            }
            FilterOp::Equals(value) => {
                builder.push(format!(" AND {column} = "));
                push_scalar(builder, value);
            }
            FilterOp::Contains(needle) => {
                builder
                    .push(format!(" AND {column} ILIKE "))
                    .push_bind(contains_pattern(needle))
                    .push(r" ESCAPE '\'");
            }
            FilterOp::Gt(bound) => {
                builder.push(format!(" AND {column} > "));
                push_scalar(builder, bound);
            }
            FilterOp::Lt(bound) => {
                builder.push(format!(" AND {column} < "));
                push_scalar(builder, bound);
            }
        }
    }
}

fn push_scalar(builder: &mut QueryBuilder<'static, Postgres>, value: &Scalar) {
    match value {
        Scalar::Integer(n) => builder.push_bind(*n),
        Scalar::Text(text) => builder.push_bind(text.clone()),
        Scalar::Timestamp(ts) => builder.push_bind(*ts),
    };
}

/// Column a field is ordered by
///
/// Text fields order by their stored collation key rather than the raw
/// value.
pub fn sort_column(field: UserField) -> &'static str {
    match field {
        UserField::Name => "name_sort_key",
        UserField::Email => "email_sort_key",
        other => other.column(),
    }
}

/// Append `ORDER BY`, `LIMIT` and `OFFSET`
///
/// Ties are broken by ascending id, matching the stable in-memory sort.
pub fn push_order_and_window(builder: &mut QueryBuilder<'static, Postgres>, query: &UserQuery) {
    let direction = query.sort.direction.as_sql();
    if query.sort.field == UserField::Id {
        builder.push(format!(" ORDER BY id {direction}"));
    } else {
        let column = sort_column(query.sort.field);
        builder.push(format!(" ORDER BY {column} {direction}, id ASC"));
    }

    builder
        .push(" LIMIT ")
        .push_bind(query.limit as i64)
        .push(" OFFSET ")
        .push_bind(query.offset as i64);
}
