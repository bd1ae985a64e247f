//! Port interface for persisted key-value preferences
//!
//! This is the only capability the client needs from the platform's
//! preference storage: string values addressed by string keys.

use async_trait::async_trait;
use mople_domain::Result;

/// Persisted key-value storage.
///
/// A `set` replaces the whole value stored under `key`; implementations
/// never expose a partially written value to concurrent readers.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key` (idempotent).
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every stored preference.
    async fn clear(&self) -> Result<()>;
}
