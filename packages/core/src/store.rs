//! Journal entry and user storage.
//!
//! [`JournalStore`] is the storage contract the service layer depends on;
//! [`MemStore`] is the in-process implementation. It keeps both maps and
//! both id counters behind a single `RwLock`, so id assignment and the
//! insert that follows it are one atomic step. Ids are never reused, even
//! after deletion.
//!
//! The store does no business validation: moods, usernames and word counts
//! are taken as given.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::model::{word_count, JournalEntry, JournalEntryUpdate, NewJournalEntry, NewUser, User};

/// Username of the user seeded into every fresh [`MemStore`].
pub const SEED_USERNAME: &str = "test";
const SEED_PASSWORD: &str = "password";

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Persist a new entry with `date = now` and no analysis fields.
    async fn create_journal_entry(&self, entry: NewJournalEntry) -> Result<JournalEntry, AppError>;

    async fn get_journal_entry(&self, id: i64) -> Result<Option<JournalEntry>, AppError>;

    /// Merge `update` onto an existing entry. `Ok(None)` when `id` is unknown.
    async fn update_journal_entry(
        &self,
        id: i64,
        update: JournalEntryUpdate,
    ) -> Result<Option<JournalEntry>, AppError>;

    /// All entries for `user_id`, most recent first (ties broken by descending id).
    async fn get_journal_entries_by_user_id(&self, user_id: i64)
        -> Result<Vec<JournalEntry>, AppError>;

    /// Same ordering as [`Self::get_journal_entries_by_user_id`], at most `limit` entries.
    async fn get_recent_journal_entries(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<JournalEntry>, AppError> {
        let mut entries = self.get_journal_entries_by_user_id(user_id).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    /// `true` if the entry existed and was removed.
    async fn delete_journal_entry(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Debug)]
struct Inner {
    users: BTreeMap<i64, User>,
    entries: BTreeMap<i64, JournalEntry>,
    next_user_id: i64,
    next_entry_id: i64,
}

impl Inner {
    fn insert_user(&mut self, user: NewUser) -> User {
        let id = self.next_user_id;
        self.next_user_id += 1;
        let user = User {
            id,
            username: user.username,
            password: user.password,
        };
        self.users.insert(id, user.clone());
        user
    }
}

/// In-memory [`JournalStore`]. Contents are lost on restart.
#[derive(Debug)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    /// Create a store holding only the seed user (id 1).
    pub fn new() -> Self {
        let mut inner = Inner {
            users: BTreeMap::new(),
            entries: BTreeMap::new(),
            next_user_id: 1,
            next_entry_id: 1,
        };
        inner.insert_user(NewUser {
            username: SEED_USERNAME.to_string(),
            password: SEED_PASSWORD.to_string(),
        });

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Number of entries currently held.
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JournalStore for MemStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        Ok(self.inner.write().await.insert_user(user))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_journal_entry(&self, entry: NewJournalEntry) -> Result<JournalEntry, AppError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_entry_id;
        inner.next_entry_id += 1;

        let created = JournalEntry {
            id,
            date: Utc::now(),
            word_count: Some(word_count(&entry.content)),
            mood: entry.mood,
            content: entry.content,
            user_id: entry.user_id,
            sentiment: None,
            energy: None,
        };
        inner.entries.insert(id, created.clone());
        Ok(created)
    }

    async fn get_journal_entry(&self, id: i64) -> Result<Option<JournalEntry>, AppError> {
        Ok(self.inner.read().await.entries.get(&id).cloned())
    }

    async fn update_journal_entry(
        &self,
        id: i64,
        update: JournalEntryUpdate,
    ) -> Result<Option<JournalEntry>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.entries.get_mut(&id).map(|entry| {
            entry.apply(&update);
            entry.clone()
        }))
    }

    async fn get_journal_entries_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Vec<JournalEntry>, AppError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<JournalEntry> = inner
            .entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn delete_journal_entry(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.entries.remove(&id).is_some())
    }
}
