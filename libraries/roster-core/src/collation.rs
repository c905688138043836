//! Text collation and sort keys
//!
//! Text is compared at "base" strength: canonical decomposition, combining
//! marks dropped, lower-cased, and `đ` folded onto `d`. Under this rule
//! `Ánh`, `ánh` and `Anh` are equal while `Anh` and `Bình` are not.
//!
//! Personal names sort by their last component (the given name in
//! Vietnamese order), then the first component (family name), then the
//! components in between.
//!
//! Both orders can be flattened into plain strings whose byte order matches
//! the comparison, so a database can index and sort them with a binary
//! (`"C"`) collation.

use crate::field::{FieldValue, UserField};
use crate::types::User;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const D_WITH_STROKE: char = '\u{0111}';

// Sorts below every character a folded name component can contain
const KEY_SEPARATOR: char = '\u{1}';

/// Fold a string to its base-level comparison key
pub fn base_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == D_WITH_STROKE { 'd' } else { c })
        .collect()
}

/// Compare two strings at base level
pub fn compare_base(a: &str, b: &str) -> Ordering {
    base_key(a).cmp(&base_key(b))
}

/// Pre-folded components of a personal name
///
/// Field order matters: the derived ordering compares `last`, then
/// `first`, then `middle`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameKey {
    last: String,
    first: String,
    middle: String,
}

impl NameKey {
    pub fn new(name: &str) -> Self {
        let parts: Vec<&str> = name.split_whitespace().collect();
        let (first, middle, last) = match parts.as_slice() {
            [] => ("", String::new(), ""),
            [only] => (*only, String::new(), *only),
            [first, middle @ .., last] => (*first, middle.join(" "), *last),
        };

        Self {
            last: base_key(last),
            first: base_key(first),
            middle: base_key(&middle),
        }
    }

    /// Flatten into a string with the same ordering as the key itself
    pub fn sort_key(&self) -> String {
        let mut key =
            String::with_capacity(self.last.len() + self.first.len() + self.middle.len() + 2);
        key.push_str(&self.last);
        key.push(KEY_SEPARATOR);
        key.push_str(&self.first);
        key.push(KEY_SEPARATOR);
        key.push_str(&self.middle);
        key
    }
}

/// Byte-ordered sort key for a personal name
pub fn name_sort_key(name: &str) -> String {
    NameKey::new(name).sort_key()
}

/// Byte-ordered sort key for any other text field
pub fn text_sort_key(text: &str) -> String {
    base_key(text)
}

/// Compare two personal names
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NameKey::new(a).cmp(&NameKey::new(b))
}

/// Precomputed sort key for one field of one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Null,
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Text(String),
    Name(NameKey),
}

impl SortKey {
    /// Build the key `field` contributes for `user`
    pub fn for_field(field: UserField, user: &User) -> Self {
        match field.value(user) {
            FieldValue::Null => SortKey::Null,
            FieldValue::Integer(n) => SortKey::Integer(n),
            FieldValue::Timestamp(ts) => SortKey::Timestamp(ts),
            FieldValue::Text(text) if field == UserField::Name => SortKey::Name(NameKey::new(text)),
            FieldValue::Text(text) => SortKey::Text(base_key(text)),
        }
    }

    /// Ascending order; nulls sort after every value
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Null, _) => Ordering::Greater,
            (_, SortKey::Null) => Ordering::Less,
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Name(a), SortKey::Name(b)) => a.cmp(b),
            (a, b) => a.rendered().cmp(&b.rendered()),
        }
    }

    fn rendered(&self) -> String {
        match self {
            SortKey::Null => String::new(),
            SortKey::Integer(n) => n.to_string(),
            SortKey::Timestamp(ts) => ts.to_rfc3339(),
            SortKey::Text(text) => text.clone(),
            SortKey::Name(key) => format!("{} {} {}", key.last, key.first, key.middle),
        }
    }
}
