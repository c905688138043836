use crate::users;
use async_trait::async_trait;
use roster_core::error::Result;
use roster_core::pagination::{CursorPage, PageRequest};
use roster_core::query::UserQuery;
use roster_core::storage::UserStore;
use roster_core::types::{NewUser, SearchCriteria, User, UserId, UserPatch};
use sqlx::PgPool;

/// User storage backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(users::get_by_id(&self.pool, id).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list_page(&self, page: PageRequest) -> Result<CursorPage<User>> {
        Ok(users::list_after(&self.pool, page).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<User>> {
        Ok(users::search(&self.pool, criteria).await?)
    }

    #[tracing::instrument(skip(self, query), fields(sort = %query.sort.field))]
    async fn query(&self, query: &UserQuery) -> Result<Vec<User>> {
        Ok(users::query(&self.pool, query).await?)
    }

    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> Result<bool> {
        Ok(users::email_exists(&self.pool, email, exclude).await?)
    }

    #[tracing::instrument(skip(self, user))]
    async fn insert(&self, user: NewUser) -> Result<User> {
        Ok(users::create(&self.pool, user).await?)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
        Ok(users::update(&self.pool, id, patch).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: UserId) -> Result<Option<User>> {
        Ok(users::delete(&self.pool, id).await?)
    }

    async fn count(&self) -> Result<i64> {
        Ok(users::count(&self.pool).await?)
    }
}
