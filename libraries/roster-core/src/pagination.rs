//! Forward-only cursor pagination
//!
//! A page holds rows with `id > cursor`, ascending by id, at most `limit`
//! rows. The next cursor is the id of the last row, and is only present
//! when the page came back full. Ids are immutable and strictly
//! increasing, so deleted rows are skipped and no row is ever returned
//! twice across pages.

use crate::types::UserId;
use serde_json::Value;

/// Default page size of the list endpoint
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Default row count of the query endpoint
pub const DEFAULT_QUERY_LIMIT: usize = 10;

/// Hard upper bound for any limit
pub const MAX_LIMIT: usize = 1000;

/// A request for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Exclusive lower bound on ids; 0 starts from the beginning
    pub cursor: i64,

    /// Maximum rows in the page, within `1..=MAX_LIMIT`
    pub limit: usize,
}

impl PageRequest {
    /// Build a page request, clamping out-of-range values
    pub fn new(cursor: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            cursor: cursor.filter(|c| *c > 0).unwrap_or(0),
            limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT),
        }
    }

    /// Build a page request from raw query-string values
    ///
    /// Anything that does not parse as an integer falls back to the default.
    pub fn from_raw(cursor: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            cursor.and_then(|c| c.trim().parse().ok()),
            limit.and_then(|l| l.trim().parse().ok()),
        )
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the cursor for the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<UserId>,
}

impl<T> CursorPage<T> {
    /// Assemble a page from rows already limited to `limit`
    pub fn from_rows(items: Vec<T>, limit: usize, id_of: impl Fn(&T) -> UserId) -> Self {
        let next_cursor = if !items.is_empty() && items.len() == limit {
            items.last().map(id_of)
        } else {
            None
        };

        Self { items, next_cursor }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Clamp a requested limit: non-positive means default, large means `MAX_LIMIT`
pub fn clamp_limit(limit: Option<i64>, default: usize) -> usize {
    match limit {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(MAX_LIMIT).min(MAX_LIMIT),
        _ => default,
    }
}

/// Coerce a loosely typed JSON number (or numeric string) to an integer
pub fn coerce_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
