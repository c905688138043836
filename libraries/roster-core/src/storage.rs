//! Storage trait for user persistence
//!
//! Implemented by the PostgreSQL and in-memory backends in
//! `roster-storage`. Both must satisfy the same contract; the shared test
//! suite in that crate runs against each of them.

use crate::error::Result;
use crate::pagination::{CursorPage, PageRequest};
use crate::query::UserQuery;
use crate::types::{NewUser, SearchCriteria, User, UserId, UserPatch};
use crate::validation::ValidationPolicy;
use async_trait::async_trait;

/// User storage backend
///
/// Implementations only enforce what the storage itself guarantees (id
/// assignment, e-mail uniqueness). Input validation happens before a call
/// reaches the store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Validation rules this backend requires of new users
    fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::default()
    }

    /// Get a user by id
    async fn get(&self, id: UserId) -> Result<Option<User>>;

    /// Users with `id > cursor`, ascending, at most `limit`
    async fn list_page(&self, page: PageRequest) -> Result<CursorPage<User>>;

    /// Users matching every criterion, ascending by id
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<User>>;

    /// Execute a validated query and return the selected window of rows
    async fn query(&self, query: &UserQuery) -> Result<Vec<User>>;

    /// Whether another user (other than `exclude`) owns this e-mail
    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> Result<bool>;

    /// Insert a user, assigning id and timestamps
    ///
    /// # Errors
    ///
    /// [`crate::RosterError::DuplicateEmail`] if the e-mail is in use.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Apply a patch and bump `updated_at`; `None` if the user is gone
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>>;

    /// Remove a user; returns its last state, `None` if absent
    async fn delete(&self, id: UserId) -> Result<Option<User>>;

    /// Number of stored users
    async fn count(&self) -> Result<i64>;
}
