//! In-memory user table
//!
//! Rows live in an arena indexed by `id - 1`. Deleting a user empties its
//! slot, so ids are never reused and listing in slot order is listing in id
//! order. A second map keyed by the lower-cased e-mail enforces uniqueness.
//! Timestamps are truncated to milliseconds, the precision the API renders.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use roster_core::error::{Result, RosterError};
use roster_core::pagination::{CursorPage, PageRequest};
use roster_core::query::{engine, UserQuery};
use roster_core::storage::UserStore;
use roster_core::types::{NewUser, SearchCriteria, User, UserId, UserPatch};
use roster_core::validation::ValidationPolicy;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Users shipped with the demo backend
const SAMPLE_USERS: [(&str, &str, i32); 7] = [
    ("Trần Vân Anh", "nguyenvana@gmail.com", 25),
    ("Trần Linh Anh", "tranthib@yahoo.com", 30),
    ("Trần Thị An", "levanc@gmail.com", 28),
    ("Nguyễn Minh Anh", "phamthid@hotmail.com", 22),
    ("Trần Linh Bình", "hoangvane@gmail.com", 35),
    ("Trần Vân Ánh", "tranvananh@gmail.com", 25),
    ("Tạ Ngọc Linh An", "tangoclinhan@gmail.com", 7),
];

const TIMESTAMP_DIGITS: u16 = 3;

fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(TIMESTAMP_DIGITS)
}

#[derive(Default)]
struct Table {
    slots: Vec<Option<User>>,
    emails: HashMap<String, UserId>,
}

impl Table {
    fn slot(id: UserId) -> Option<usize> {
        usize::try_from(id.get()).ok()?.checked_sub(1)
    }

    fn get(&self, id: UserId) -> Option<&User> {
        self.slots.get(Self::slot(id)?)?.as_ref()
    }

    fn get_mut(&mut self, id: UserId) -> Option<&mut User> {
        let slot = Self::slot(id)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    fn rows(&self) -> impl Iterator<Item = &User> {
        self.slots.iter().flatten()
    }

    fn owner_of(&self, email: &str) -> Option<UserId> {
        self.emails.get(&email.to_lowercase()).copied()
    }

    fn insert(&mut self, user: NewUser) -> Result<User> {
        if self.owner_of(&user.email).is_some() {
            return Err(RosterError::DuplicateEmail(user.email));
        }

        let id = UserId::new(self.slots.len() as i64 + 1);
        let now = current_timestamp();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: now,
            updated_at: now,
        };

        self.emails.insert(user.email.to_lowercase(), id);
        self.slots.push(Some(user.clone()));
        Ok(user)
    }
}

/// User storage kept in process memory
pub struct MemoryUserStore {
    table: RwLock<Table>,
}

impl MemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }

    /// Create a store holding the demo users
    pub fn with_sample_data() -> Self {
        let mut table = Table::default();
        for (name, email, age) in SAMPLE_USERS {
            let user = NewUser {
                name: name.to_string(),
                email: email.to_string(),
                age: Some(age),
            };
            if let Err(e) = table.insert(user) {
                tracing::warn!("Skipping sample user: {}", e);
            }
        }

        Self {
            table: RwLock::new(table),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::require_age()
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn list_page(&self, page: PageRequest) -> Result<CursorPage<User>> {
        let table = self.table.read().await;
        // Slot `cursor` holds id `cursor + 1`, the first id past the cursor
        let start = usize::try_from(page.cursor).unwrap_or(0);
        let items: Vec<User> = table
            .slots
            .iter()
            .skip(start)
            .flatten()
            .take(page.limit)
            .cloned()
            .collect();

        Ok(CursorPage::from_rows(items, page.limit, |user| user.id))
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows()
            .filter(|user| criteria.matches(user))
            .cloned()
            .collect())
    }

    async fn query(&self, query: &UserQuery) -> Result<Vec<User>> {
        let matched: Vec<User> = self
            .table
            .read()
            .await
            .rows()
            .filter(|user| engine::matches(&query.filters, user))
            .cloned()
            .collect();

        // Slots are in id order, which the stable sort preserves for ties
        let sorted = engine::sort_users(matched, query.sort);
        Ok(engine::window(sorted, query.offset, query.limit))
    }

    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> Result<bool> {
        let table = self.table.read().await;
        Ok(table
            .owner_of(email)
            .is_some_and(|owner| Some(owner) != exclude))
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        self.table.write().await.insert(user)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
        let mut table = self.table.write().await;

        let Some(current) = table.get(id) else {
            return Ok(None);
        };
        let old_key = current.email.to_lowercase();

        let new_key = patch.email.as_ref().map(|email| email.to_lowercase());
        if let Some(key) = &new_key {
            if table.emails.get(key).is_some_and(|owner| *owner != id) {
                return Err(RosterError::DuplicateEmail(
                    patch.email.clone().unwrap_or_default(),
                ));
            }
        }

        if let Some(key) = new_key {
            table.emails.remove(&old_key);
            table.emails.insert(key, id);
        }

        let Some(user) = table.get_mut(id) else {
            return Ok(None);
        };
        patch.apply_to(user);
        // Keep updated_at strictly increasing even within one millisecond
        let now = current_timestamp();
        user.updated_at = if now > user.updated_at {
            now
        } else {
            user.updated_at + Duration::milliseconds(1)
        };

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>> {
        let mut table = self.table.write().await;
        let Some(slot) = Table::slot(id) else {
            return Ok(None);
        };
        let Some(user) = table.slots.get_mut(slot).and_then(Option::take) else {
            return Ok(None);
        };

        table.emails.remove(&user.email.to_lowercase());
        Ok(Some(user))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.table.read().await.rows().count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_data_is_loaded() {
        let store = MemoryUserStore::with_sample_data();
        assert_eq!(store.count().await.unwrap(), 7);

        let first = store.get(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(first.name, "Trần Vân Anh");
    }

    #[tokio::test]
    async fn test_deleted_slot_is_never_reused() {
        let store = MemoryUserStore::new();
        let a = store
            .insert(NewUser {
                name: "An".to_string(),
                email: "an@example.com".to_string(),
                age: Some(20),
            })
            .await
            .unwrap();
        store.delete(a.id).await.unwrap();

        let b = store
            .insert(NewUser {
                name: "An".to_string(),
                email: "an@example.com".to_string(),
                age: Some(20),
            })
            .await
            .unwrap();
        assert_eq!(b.id, UserId::new(2));
        assert!(store.get(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_timestamps_have_millisecond_precision() {
        let store = MemoryUserStore::with_sample_data();
        let user = store
            .update(UserId::new(1), UserPatch::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(user.updated_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert!(user.updated_at > user.created_at);
    }

    #[tokio::test]
    async fn test_out_of_range_ids_are_absent() {
        let store = MemoryUserStore::with_sample_data();
        assert!(store.get(UserId::new(0)).await.unwrap().is_none());
        assert!(store.get(UserId::new(-4)).await.unwrap().is_none());
        assert!(store.delete(UserId::new(99)).await.unwrap().is_none());
    }
}
