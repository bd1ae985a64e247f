//! Composition root
//!
//! Wires the preference store, credential repository, bridge, request
//! interceptor, refresh endpoint, authenticator and HTTP engine together.

use std::sync::Arc;

use mople_common::RuntimeBridge;
use mople_core::{AuthSession, CredentialRepository, CredentialStore, PreferenceStore, SessionNotifier};
use mople_domain::{Config, MopleError, Result};
use tokio::runtime::Handle;
use tracing::info;

use crate::auth::{BearerInterceptor, BlockingCredentials, HttpTokenRefreshApi, RefreshAuthenticator};
use crate::errors::InfraError;
use crate::http::AuthenticatedClient;
use crate::storage::{FilePreferenceStore, MemoryPreferenceStore};

/// Everything an application needs to talk to the Mople API.
pub struct ClientContext {
    config: Config,
    repository: Arc<CredentialRepository>,
    session: AuthSession,
    client: AuthenticatedClient,
}

impl ClientContext {
    /// Build the client stack on `handle`'s runtime.
    ///
    /// Must be called from a plain thread: the blocking HTTP client cannot be
    /// created inside an async context. The store is opened and loaded
    /// through the bridge.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the preferences file
    /// cannot be opened, or the HTTP transport cannot be created.
    pub fn build(config: Config, handle: Handle) -> Result<Self> {
        config.validate()?;

        let bridge = RuntimeBridge::new(handle, config.storage.read_timeout());
        let preferences = Self::open_preferences(&config, &bridge)?;

        let repository = Arc::new(CredentialRepository::new(preferences));
        let loader = repository.clone();
        let signed_in = bridge
            .block_on("credential_load", async move { loader.load().await })
            .map_err(|e| MopleError::from(InfraError::from(e)))??;

        let store: Arc<dyn CredentialStore> = repository.clone();
        let credentials = BlockingCredentials::new(store.clone(), bridge);
        let notifier = SessionNotifier::new();

        let refresh_api = Arc::new(HttpTokenRefreshApi::new(&config.api)?);
        let authenticator =
            RefreshAuthenticator::new(credentials.clone(), refresh_api, notifier.clone());

        let client = AuthenticatedClient::builder(config.api.clone())
            .interceptor(Arc::new(BearerInterceptor::new(credentials)))
            .authenticator(Arc::new(authenticator))
            .build()?;

        let session = AuthSession::new(store, notifier);

        info!(base_url = %config.api.base_url, signed_in, "Mople client ready");
        Ok(Self { config, repository, session, client })
    }

    fn open_preferences(config: &Config, bridge: &RuntimeBridge) -> Result<Arc<dyn PreferenceStore>> {
        let Some(path) = config.storage.path.clone() else {
            return Ok(Arc::new(MemoryPreferenceStore::new()));
        };
        let store = bridge
            .block_on("preferences_open", async move { FilePreferenceStore::open(path).await })
            .map_err(|e| MopleError::from(InfraError::from(e)))??;
        Ok(Arc::new(store))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialRepository> {
        &self.repository
    }
}
