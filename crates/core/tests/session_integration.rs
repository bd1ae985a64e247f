//! Integration tests for the session façade over the credential repository

mod support;

use std::sync::Arc;

use mople_core::{AuthSession, CredentialRepository, CredentialStore, SessionNotifier};
use mople_domain::{Credential, MopleError, SessionEvent};
use support::FlakyPreferences;

fn session() -> (Arc<FlakyPreferences>, Arc<CredentialRepository>, AuthSession) {
    let preferences = Arc::new(FlakyPreferences::default());
    let repository = Arc::new(CredentialRepository::new(preferences.clone()));
    let session = AuthSession::new(repository.clone(), SessionNotifier::new());
    (preferences, repository, session)
}

/// Validates the sign-in → sign-out lifecycle and the events it publishes.
#[tokio::test]
async fn test_sign_in_and_out_publish_events() {
    let (_, repository, session) = session();
    let mut events = session.events();

    assert!(!session.is_signed_in().await);

    session.sign_in(Credential::new("A1", "B1")).await.unwrap();
    assert!(session.is_signed_in().await);
    assert_eq!(repository.current().await.unwrap(), Some(Credential::new("A1", "B1")));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn);

    session.sign_out().await.unwrap();
    assert!(!session.is_signed_in().await);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
}

/// Validates that a failed write leaves the previous credential intact and
/// publishes nothing.
#[tokio::test]
async fn test_failed_sign_in_keeps_previous_credential() {
    let (preferences, repository, session) = session();
    session.sign_in(Credential::new("A1", "B1")).await.unwrap();
    let mut events = session.events();

    preferences.fail_writes(true).await;
    let result = session.sign_in(Credential::new("A2", "B2")).await;

    assert!(matches!(result, Err(MopleError::Storage(_))));
    assert_eq!(repository.current().await.unwrap(), Some(Credential::new("A1", "B1")));
    assert_eq!(repository.snapshot(), Some(Credential::new("A1", "B1")));
    assert!(events.try_recv().is_err());
}

/// Validates that concurrent replacements never produce a torn pair: every
/// observed value is one of the pairs that was written.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replacements_stay_whole() {
    let (_, repository, _) = session();

    let writers: Vec<_> = (0..16)
        .map(|i| {
            let repository = repository.clone();
            tokio::spawn(async move {
                repository
                    .replace(Credential::new(format!("A{i}"), format!("B{i}")))
                    .await
                    .unwrap();
                repository.current().await.unwrap()
            })
        })
        .collect();

    for writer in writers {
        let observed = writer.await.unwrap().unwrap();
        let index = observed.access_token.trim_start_matches('A');
        assert_eq!(observed.refresh_token, format!("B{index}"));
    }
}

/// Validates that notifier clones share one channel.
#[tokio::test]
async fn test_notifier_clones_share_subscribers() {
    let (_, _, session) = session();
    let mut events = session.events();

    let notifier = session.notifier().clone();
    notifier.notify(SessionEvent::Expired);

    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
}
