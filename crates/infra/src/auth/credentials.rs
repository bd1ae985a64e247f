//! Blocking access to the credential store
//!
//! The HTTP engine runs interceptors and the authenticator on the thread that
//! executes the request. Every store access from that thread goes through
//! [`RuntimeBridge`], which bounds the wait.

use std::sync::Arc;

use mople_common::{CommonError, RuntimeBridge};
use mople_core::CredentialStore;
use mople_domain::{Credential, MopleError, Result};
use tracing::warn;

use crate::errors::InfraError;

#[derive(Clone)]
pub struct BlockingCredentials {
    store: Arc<dyn CredentialStore>,
    bridge: RuntimeBridge,
}

impl BlockingCredentials {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, bridge: RuntimeBridge) -> Self {
        Self { store, bridge }
    }

    /// Read the stored credential, waiting at most the bridge timeout.
    ///
    /// # Errors
    /// Returns the store's error, or `MopleError::Internal` when the read
    /// timed out or could not be bridged.
    pub fn current(&self) -> Result<Option<Credential>> {
        let store = self.store.clone();
        self.bridge
            .block_on("credential_read", async move { store.current().await })
            .map_err(|e| MopleError::from(InfraError::from(e)))?
    }

    /// Persist `credential` on a spawned task, waiting at most the bridge
    /// timeout for it.
    ///
    /// A write that outlasts the wait is not abandoned: it keeps running and
    /// the call reports [`WriteStatus::Pending`].
    ///
    /// # Errors
    /// Returns the store's error, or `MopleError::Internal` when the write
    /// could not be bridged or its task failed.
    pub fn replace(&self, credential: Credential) -> Result<WriteStatus> {
        let store = self.store.clone();
        match self
            .bridge
            .spawn_and_wait("credential_write", async move { store.replace(credential).await })
        {
            Ok(written) => written.map(|()| WriteStatus::Persisted),
            Err(CommonError::AsyncTimeout { duration, .. }) => {
                warn!(waited = ?duration, "Credential write still in flight");
                Ok(WriteStatus::Pending)
            }
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}

/// How far a [`BlockingCredentials::replace`] got before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The store holds the new credential.
    Persisted,
    /// The write is still running in the background.
    Pending,
}
