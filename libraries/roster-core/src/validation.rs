//! Input validation for create and update
//!
//! Every violated rule is reported, not just the first one. Messages are
//! stable strings that clients match on.

use crate::error::{Result, RosterError};
use crate::pagination::coerce_integer;
use crate::types::{NewUser, UserInput, UserPatch};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const NAME_REQUIRED: &str = "name is required";
pub const EMAIL_REQUIRED: &str = "email is required";
pub const AGE_REQUIRED: &str = "age is required";
pub const EMAIL_INVALID: &str = "email format is invalid";
pub const AGE_OUT_OF_RANGE: &str = "age must be an integer between 1 and 150";
pub const NAME_TOO_SHORT: &str = "name must be at least 2 characters";

const MIN_NAME_CHARS: usize = 2;
const MIN_AGE: i64 = 1;
const MAX_AGE: i64 = 150;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Backend-specific validation rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Reject creates that carry no age
    pub require_age: bool,
}

impl ValidationPolicy {
    pub fn require_age() -> Self {
        Self { require_age: true }
    }
}

/// Validate a create payload
pub fn validate_create(input: &UserInput, policy: ValidationPolicy) -> Result<NewUser> {
    let mut errors = Vec::new();

    let name = non_blank(input.name.as_deref());
    let email = non_blank(input.email.as_deref());
    let age = input.age.as_ref().filter(|v| !v.is_null());

    if name.is_none() {
        errors.push(NAME_REQUIRED.to_string());
    }
    if email.is_none() {
        errors.push(EMAIL_REQUIRED.to_string());
    }
    if age.is_none() && policy.require_age {
        errors.push(AGE_REQUIRED.to_string());
    }

    if let Some(email) = email {
        check_email(email, &mut errors);
    }
    let age = age.and_then(|raw| check_age(raw, &mut errors));
    if let Some(name) = name {
        check_name(name, &mut errors);
    }

    if !errors.is_empty() {
        return Err(RosterError::Validation(errors));
    }

    Ok(NewUser {
        name: name.unwrap_or_default().to_string(),
        email: email.unwrap_or_default().to_string(),
        age,
    })
}

/// Validate a partial update; only supplied fields are checked
pub fn validate_patch(input: &UserInput) -> Result<UserPatch> {
    let mut errors = Vec::new();

    let email = input.email.as_deref().map(str::trim);
    let name = input.name.as_deref().map(str::trim);

    if let Some(email) = email {
        check_email(email, &mut errors);
    }
    let age = input
        .age
        .as_ref()
        .filter(|v| !v.is_null())
        .and_then(|raw| check_age(raw, &mut errors));
    if let Some(name) = name {
        check_name(name, &mut errors);
    }

    if !errors.is_empty() {
        return Err(RosterError::Validation(errors));
    }

    Ok(UserPatch {
        name: name.map(str::to_string),
        email: email.map(str::to_string),
        age,
    })
}

/// Check the e-mail syntax on its own
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if !is_valid_email(email) {
        errors.push(EMAIL_INVALID.to_string());
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    if name.chars().count() < MIN_NAME_CHARS {
        errors.push(NAME_TOO_SHORT.to_string());
    }
}

fn check_age(raw: &Value, errors: &mut Vec<String>) -> Option<i32> {
    match coerce_integer(Some(raw)) {
        Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => i32::try_from(age).ok(),
        _ => {
            errors.push(AGE_OUT_OF_RANGE.to_string());
            None
        }
    }
}
