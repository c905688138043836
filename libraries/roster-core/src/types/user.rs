/// User domain types
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, monotonically assigned identifier
    pub id: UserId,

    /// Display name, possibly several space-separated components
    pub name: String,

    /// E-mail address, unique ignoring case
    pub email: String,

    /// Age in years (required by the in-memory backend only)
    pub age: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a user that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// Validated partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    /// Returns `true` when the patch changes nothing but the timestamp
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }

    /// Apply the patch to a user in place
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
    }
}

/// Unvalidated user payload as received from a client
///
/// `age` stays a raw JSON value so that `"25"` and `25` are both accepted
/// and anything else is reported as a validation failure rather than a
/// decoding error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub age: Option<Value>,
}

/// Simple search criteria, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Exact e-mail match, ignoring case
    pub email: Option<String>,

    /// Case-insensitive substring of the name
    pub name: Option<String>,

    /// Exact age
    pub age: Option<i32>,
}

impl SearchCriteria {
    /// Returns `true` when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.age.is_none()
    }

    /// Check whether a user satisfies every criterion
    pub fn matches(&self, user: &User) -> bool {
        if let Some(email) = &self.email {
            if user.email.to_lowercase() != email.to_lowercase() {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !user.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(age) = self.age {
            if user.age != Some(age) {
                return false;
            }
        }
        true
    }
}
