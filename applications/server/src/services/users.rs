//! User service shared by the REST and GraphQL adapters
//!
//! Runs validation and the e-mail and existence pre-checks before handing
//! work to the configured [`UserStore`]. The store's own uniqueness
//! enforcement still applies, so a race between the pre-check and the
//! write surfaces as the same `DuplicateEmail` error.

use roster_core::error::{Result, RosterError};
use roster_core::field::UserField;
use roster_core::pagination::{CursorPage, PageRequest};
use roster_core::query::QueryRequest;
use roster_core::types::{SearchCriteria, User, UserId, UserInput};
use roster_core::validation::{validate_create, validate_patch};
use roster_core::UserStore;
use std::sync::Arc;

/// Message for a search without any criterion
pub const EMPTY_SEARCH: &str =
    "search criteria cannot be empty, provide at least one of email, name or age";

/// Rows produced by a query together with the fields to return
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub users: Vec<User>,
    pub select: Vec<UserField>,
}

pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Get a user, `None` when absent
    pub async fn find(&self, id: UserId) -> Result<Option<User>> {
        self.store.get(id).await
    }

    /// Get a user or fail with `NotFound`
    pub async fn get(&self, id: UserId) -> Result<User> {
        self.store
            .get(id)
            .await?
            .ok_or(RosterError::NotFound(id))
    }

    pub async fn list(&self, page: PageRequest) -> Result<CursorPage<User>> {
        self.store.list_page(page).await
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<User>> {
        if criteria.is_empty() {
            return Err(RosterError::Validation(vec![EMPTY_SEARCH.to_string()]));
        }
        self.store.search(criteria).await
    }

    pub async fn query(&self, request: &QueryRequest) -> Result<QueryOutcome> {
        let query = request.parse()?;
        let users = self.store.query(&query).await?;
        Ok(QueryOutcome {
            users,
            select: query.select,
        })
    }

    pub async fn create(&self, input: &UserInput) -> Result<User> {
        let user = validate_create(input, self.store.validation_policy())?;

        if self.store.email_taken(&user.email, None).await? {
            return Err(RosterError::DuplicateEmail(user.email));
        }

        let user = self.store.insert(user).await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Partial update; existence is checked before validation
    pub async fn update(&self, id: UserId, input: &UserInput) -> Result<User> {
        if self.store.get(id).await?.is_none() {
            return Err(RosterError::NotFound(id));
        }

        let patch = validate_patch(input)?;
        if let Some(email) = &patch.email {
            if self.store.email_taken(email, Some(id)).await? {
                return Err(RosterError::DuplicateEmail(email.clone()));
            }
        }

        let user = self
            .store
            .update(id, patch)
            .await?
            .ok_or(RosterError::NotFound(id))?;
        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: UserId) -> Result<User> {
        let user = self
            .store
            .delete(id)
            .await?
            .ok_or(RosterError::NotFound(id))?;
        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user)
    }
}
