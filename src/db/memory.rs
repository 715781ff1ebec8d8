use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::{AccountStore, StoreError};
use crate::models::Account;

/// In-process [`AccountStore`] for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<Uuid, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account with an already-hashed password and return it.
    pub fn insert(&self, email: &str, password_hash: &str, name: &str) -> Account {
        let account = Account {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.accounts.insert(account.id, account.clone());
        account
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_password(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool, StoreError> {
        // The shard write lock makes compare and replace one step
        let Some(mut entry) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };
        if entry.password_hash != expected_hash {
            return Ok(false);
        }
        entry.password_hash = new_hash.to_string();
        Ok(true)
    }
}
