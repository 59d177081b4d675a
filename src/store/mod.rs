// Credential storage
// Persistent key-value store holding the token pair

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;

/// Store key for the short-lived bearer token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Store key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Async persistent key-value store for credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}
