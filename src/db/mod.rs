pub mod accounts;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Account;

pub use accounts::PgAccountStore;
pub use memory::MemoryAccountStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Account lookups and password updates needed by the reset flow.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Case-insensitive email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Replace the stored hash only if it still equals `expected_hash`.
    /// Returns false when the account is unknown or the hash has moved on.
    async fn update_password(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool, StoreError>;
}
