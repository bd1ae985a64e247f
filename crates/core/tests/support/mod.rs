//! Shared test helpers for `mople-core` integration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use mople_core::PreferenceStore;
use mople_domain::{MopleError, Result as DomainResult};
use tokio::sync::RwLock;

/// In-memory `PreferenceStore` that can be switched into a failing mode.
#[derive(Default)]
pub struct FlakyPreferences {
    values: RwLock<HashMap<String, String>>,
    failing: RwLock<bool>,
}

impl FlakyPreferences {
    pub async fn fail_writes(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    async fn check(&self) -> DomainResult<()> {
        if *self.failing.read().await {
            return Err(MopleError::Storage("preferences unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FlakyPreferences {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> DomainResult<()> {
        self.check().await?;
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.check().await?;
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.check().await?;
        self.values.write().await.clear();
        Ok(())
    }
}
