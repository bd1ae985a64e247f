//! Single-flight token refresh on `401 Unauthorized`

use std::sync::Arc;

use mople_common::{ErrorClassification, ErrorSeverity};
use mople_core::{RefreshError, SessionNotifier, TokenRefreshApi};
use mople_domain::{Credential, SessionEvent};
use parking_lot::Mutex;
use reqwest::blocking::Request;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, error, info, warn};

use super::credentials::{BlockingCredentials, WriteStatus};
use super::header::{bearer_header_value, bearer_token};
use crate::http::{Authenticator, ResponseHead};

/// Outcome of the locked read-refresh-write section.
enum Resolution {
    /// Retry with this access token.
    Retry(String),
    GiveUp,
}

/// A refreshed pair whose write outlasted the bridge wait.
struct InFlight {
    /// Refresh token the store holds until the write lands.
    replaced: String,
    issued: Credential,
}

/// What the authenticator remembers between `401`s. Guarded by the
/// single-flight mutex.
#[derive(Default)]
struct RefreshState {
    in_flight: Option<InFlight>,
    /// Refresh token the endpoint last rejected.
    rejected: Option<String>,
}

impl RefreshState {
    /// The newest credential known: the stored one, or the in-flight pair
    /// while the store still holds the pair it replaces.
    fn effective(&mut self, stored: Credential) -> Credential {
        match self.in_flight.take() {
            Some(pending) if stored.usable_refresh_token() == Some(pending.replaced.as_str()) => {
                let issued = pending.issued.clone();
                self.in_flight = Some(pending);
                issued
            }
            _ => stored,
        }
    }
}

/// [`Authenticator`] that refreshes the credential pair and retries.
///
/// The whole read-refresh-write sequence runs under one mutex, so concurrent
/// `401`s queue behind the holder. A queued caller whose failed request
/// carried an older token than the store now holds retries with the stored
/// token and makes no refresh call of its own. A refresh token the endpoint
/// rejected is never sent again.
pub struct RefreshAuthenticator {
    credentials: BlockingCredentials,
    refresh_api: Arc<dyn TokenRefreshApi>,
    notifier: SessionNotifier,
    state: Mutex<RefreshState>,
}

impl RefreshAuthenticator {
    #[must_use]
    pub fn new(
        credentials: BlockingCredentials,
        refresh_api: Arc<dyn TokenRefreshApi>,
        notifier: SessionNotifier,
    ) -> Self {
        Self { credentials, refresh_api, notifier, state: Mutex::new(RefreshState::default()) }
    }

    fn resolve(&self, failed_token: Option<&str>) -> Resolution {
        let mut state = self.state.lock();

        let stored = match self.credentials.current() {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!("No stored credential; not refreshing");
                state.in_flight = None;
                return Resolution::GiveUp;
            }
            Err(e) => {
                warn!(error = %e, "Credential read failed; not refreshing");
                return Resolution::GiveUp;
            }
        };
        let credential = state.effective(stored);

        if let Some(current) = credential.usable_access_token() {
            if failed_token != Some(current) {
                debug!("Access token already rotated; retrying with stored token");
                return Resolution::Retry(current.to_string());
            }
        }

        let Some(refresh_token) = credential.usable_refresh_token() else {
            debug!("Stored refresh token is blank; not refreshing");
            return Resolution::GiveUp;
        };
        if state.rejected.as_deref() == Some(refresh_token) {
            debug!("Stored refresh token was already rejected; not refreshing");
            return Resolution::GiveUp;
        }

        let refreshed = match self.refresh_api.refresh(refresh_token) {
            Ok(refreshed) => refreshed,
            Err(e) => {
                if e.is_rejection() {
                    state.rejected = Some(refresh_token.to_string());
                }
                self.report(&e);
                return Resolution::GiveUp;
            }
        };

        let access_token = refreshed.access_token.clone();
        match self.credentials.replace(refreshed.clone()) {
            Ok(WriteStatus::Persisted) => state.in_flight = None,
            Ok(WriteStatus::Pending) => {
                state.in_flight =
                    Some(InFlight { replaced: refresh_token.to_string(), issued: refreshed });
            }
            Err(e) => {
                error!(error = %e, "Refreshed credential could not be stored");
                return Resolution::GiveUp;
            }
        }

        self.notifier.notify(SessionEvent::Refreshed);
        info!("Access token refreshed");
        Resolution::Retry(access_token)
    }

    fn report(&self, err: &RefreshError) {
        if err.is_rejection() {
            self.notifier.notify(SessionEvent::Expired);
        }
        match err.severity() {
            ErrorSeverity::Info => debug!(error = %err, "Token refresh skipped"),
            ErrorSeverity::Warning => {
                warn!(error = %err, retryable = err.is_retryable(), "Token refresh failed");
            }
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(error = %err, "Token refresh failed; session expired");
            }
        }
    }
}

impl Authenticator for RefreshAuthenticator {
    fn authenticate(&self, request: &Request, response: &ResponseHead) -> Option<Request> {
        debug!(status = %response.status, url = %request.url(), "Authenticating failed request");

        let failed_token = bearer_token(request.headers());
        let Resolution::Retry(token) = self.resolve(failed_token) else {
            return None;
        };

        let value = bearer_header_value(&token)?;
        let Some(mut retry) = request.try_clone() else {
            warn!("Request body cannot be replayed; not retrying");
            return None;
        };
        retry.headers_mut().insert(AUTHORIZATION, value);
        Some(retry)
    }
}
