//! Credential repository over persisted preferences
//!
//! Manages the credential pair lifecycle:
//! - Persisting the pair as one serialized value under one key
//! - Publishing every replacement to observers
//! - Serializing writers so replacements never interleave

use std::sync::Arc;

use async_trait::async_trait;
use mople_domain::constants::CREDENTIAL_PREFERENCE_KEY;
use mople_domain::{Credential, MopleError, Result};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::CredentialStore;
use crate::storage::PreferenceStore;

/// [`CredentialStore`] backed by a [`PreferenceStore`].
///
/// Constructed once at startup and shared by `Arc` handle with the request
/// interceptor, the refresh authenticator and the session façade.
pub struct CredentialRepository {
    preferences: Arc<dyn PreferenceStore>,
    key: String,
    latest: watch::Sender<Option<Credential>>,
    write_lock: Mutex<()>,
}

impl CredentialRepository {
    /// Create a repository storing the pair under the default preference key.
    #[must_use]
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self::with_key(preferences, CREDENTIAL_PREFERENCE_KEY)
    }

    #[must_use]
    pub fn with_key(preferences: Arc<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        let (latest, _) = watch::channel(None);
        Self { preferences, key: key.into(), latest, write_lock: Mutex::new(()) }
    }

    /// Prime the observable value from persisted storage.
    ///
    /// Should be called on startup. An unreadable persisted value is logged
    /// and treated as signed out.
    ///
    /// # Returns
    /// `true` if a credential was loaded
    ///
    /// # Errors
    /// Returns error if the preference store itself cannot be read
    pub async fn load(&self) -> Result<bool> {
        let loaded = match self.read_persisted().await {
            Ok(credential) => credential,
            Err(MopleError::Serialization(message)) => {
                warn!(key = %self.key, error = %message, "Discarding unreadable stored credential");
                None
            }
            Err(e) => return Err(e),
        };

        let found = loaded.is_some();
        self.latest.send_replace(loaded);
        if found {
            info!("Credential repository initialized with stored credential");
        } else {
            debug!("No stored credential found");
        }
        Ok(found)
    }

    /// Latest published credential without touching storage.
    #[must_use]
    pub fn snapshot(&self) -> Option<Credential> {
        self.latest.borrow().clone()
    }

    async fn read_persisted(&self) -> Result<Option<Credential>> {
        let Some(raw) = self.preferences.get(&self.key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            MopleError::Serialization(format!("stored credential is not a token pair: {e}"))
        })
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn current(&self) -> Result<Option<Credential>> {
        self.read_persisted().await
    }

    async fn replace(&self, credential: Credential) -> Result<()> {
        let serialized = serde_json::to_string(&credential)
            .map_err(|e| MopleError::Serialization(format!("failed to encode credential: {e}")))?;

        let _guard = self.write_lock.lock().await;
        self.preferences.set(&self.key, serialized).await?;
        self.latest.send_replace(Some(credential));

        debug!(key = %self.key, "Credential replaced");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.preferences.remove(&self.key).await?;
        self.latest.send_replace(None);

        info!("Credential cleared");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.latest.subscribe()
    }
}
