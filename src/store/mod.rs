// Persistent key-value storage and the remembered-credentials mapping on top of it.

mod credentials;
mod sqlite;

pub use credentials::{CREDENTIALS_KEY, CredentialMap, CredentialStore};
pub use sqlite::SqliteKvStore;

use async_trait::async_trait;

use crate::error::PersistenceError;

/// Opaque string blob store keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}
