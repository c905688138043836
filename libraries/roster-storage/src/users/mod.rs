//! User table queries

pub mod sql;

use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};
use roster_core::collation::{name_sort_key, text_sort_key};
use roster_core::pagination::{CursorPage, PageRequest};
use roster_core::query::UserQuery;
use roster_core::types::{NewUser, SearchCriteria, User, UserId, UserPatch};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// Row shape shared by every statement returning users
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    name: String,
    email: String,
    age: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            age: row.age,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn into_users(rows: Vec<UserRow>) -> Vec<User> {
    rows.into_iter().map(User::from).collect()
}

/// Get a user by id
pub async fn get_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, age, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

/// Get one cursor page, ascending by id
pub async fn list_after(pool: &PgPool, page: PageRequest) -> Result<CursorPage<User>> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, age, created_at, updated_at FROM users
         WHERE id > $1
         ORDER BY id ASC
         LIMIT $2",
    )
    .bind(page.cursor)
    .bind(page.limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(CursorPage::from_rows(into_users(rows), page.limit, |user| {
        user.id
    }))
}

/// Search with simple AND-ed criteria, ascending by id
pub async fn search(pool: &PgPool, criteria: &SearchCriteria) -> Result<Vec<User>> {
    let mut builder = sql::select_users();
    sql::push_criteria(&mut builder, criteria);
    builder.push(" ORDER BY id ASC");

    let rows = builder.build_query_as::<UserRow>().fetch_all(pool).await?;
    Ok(into_users(rows))
}

/// Execute a validated query
///
/// Text fields sort on their stored collation keys, so ordering and the
/// limit/offset window both happen in the database.
pub async fn query(pool: &PgPool, query: &UserQuery) -> Result<Vec<User>> {
    let mut builder: QueryBuilder<'static, Postgres> = sql::select_users();
    sql::push_filters(&mut builder, &query.filters);
    sql::push_order_and_window(&mut builder, query);
    let rows = builder.build_query_as::<UserRow>().fetch_all(pool).await?;
    Ok(into_users(rows))
}

/// Check whether an e-mail is used by anyone but `exclude`
pub async fn email_exists(pool: &PgPool, email: &str, exclude: Option<UserId>) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
             SELECT 1 FROM users
             WHERE lower(email) = lower($1) AND ($2::BIGINT IS NULL OR id <> $2)
         )",
    )
    .bind(email)
    .bind(exclude.map(UserId::get))
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert a user
pub async fn create(pool: &PgPool, user: NewUser) -> Result<User> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (name, email, age, name_sort_key, email_sort_key)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, email, age, created_at, updated_at",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.age)
    .bind(name_sort_key(&user.name))
    .bind(text_sort_key(&user.email))
    .fetch_one(pool)
    .await
    .map_err(|e| StorageError::from_write(e, &user.email))?;

    Ok(row.into())
}

/// Apply a partial update and bump `updated_at`
///
/// `updated_at` moves forward by at least one millisecond, even when two
/// updates land within the same millisecond.
pub async fn update(pool: &PgPool, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    let email = patch.email.clone().unwrap_or_default();
    let name_key = patch.name.as_deref().map(name_sort_key);
    let email_key = patch.email.as_deref().map(text_sort_key);
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET
             name = COALESCE($2, name),
             email = COALESCE($3, email),
             age = COALESCE($4, age),
             name_sort_key = COALESCE($5, name_sort_key),
             email_sort_key = COALESCE($6, email_sort_key),
             updated_at = GREATEST(
                 date_trunc('milliseconds', clock_timestamp()),
                 updated_at + interval '1 millisecond'
             )
         WHERE id = $1
         RETURNING id, name, email, age, created_at, updated_at",
    )
    .bind(id)
    .bind(patch.name)
    .bind(patch.email)
    .bind(patch.age)
    .bind(name_key)
    .bind(email_key)
    .fetch_optional(pool)
    .await
    .map_err(|e| StorageError::from_write(e, &email))?;

    Ok(row.map(User::from))
}

/// Delete a user, returning its last state
pub async fn delete(pool: &PgPool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "DELETE FROM users WHERE id = $1
         RETURNING id, name, email, age, created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

/// Count all users
pub async fn count(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
