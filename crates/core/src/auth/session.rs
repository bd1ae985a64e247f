//! Session façade and lifecycle events

use std::sync::Arc;

use mople_domain::constants::SESSION_EVENT_CAPACITY;
use mople_domain::{Credential, Result, SessionEvent};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::ports::CredentialStore;

/// Broadcasts [`SessionEvent`]s to whoever is listening.
///
/// Cloned into every component that changes the session (the façade and the
/// refresh authenticator). Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct SessionNotifier {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self { sender }
    }

    pub fn notify(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            debug!(?event, "No session listeners");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-facing sign-in/sign-out operations.
pub struct AuthSession {
    credentials: Arc<dyn CredentialStore>,
    notifier: SessionNotifier,
}

impl AuthSession {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, notifier: SessionNotifier) -> Self {
        Self { credentials, notifier }
    }

    /// Store the credential issued by a successful sign-in.
    ///
    /// # Errors
    /// Returns error if the credential cannot be persisted
    pub async fn sign_in(&self, credential: Credential) -> Result<()> {
        self.credentials.replace(credential).await?;
        self.notifier.notify(SessionEvent::SignedIn);
        info!("Signed in");
        Ok(())
    }

    /// Delete the stored credential (logout / storage clear).
    ///
    /// # Errors
    /// Returns error if storage deletion fails
    pub async fn sign_out(&self) -> Result<()> {
        self.credentials.clear().await?;
        self.notifier.notify(SessionEvent::SignedOut);
        info!("Signed out");
        Ok(())
    }

    /// Whether a credential is currently stored. Unreadable storage counts as
    /// signed out.
    pub async fn is_signed_in(&self) -> bool {
        match self.credentials.current().await {
            Ok(credential) => credential.is_some(),
            Err(e) => {
                warn!(error = %e, "Credential store unreadable");
                false
            }
        }
    }

    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    #[must_use]
    pub fn notifier(&self) -> &SessionNotifier {
        &self.notifier
    }

    #[must_use]
    pub fn credentials(&self) -> Arc<dyn CredentialStore> {
        self.credentials.clone()
    }
}
