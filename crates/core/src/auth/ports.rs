//! Port interfaces for credential storage and token refresh
//!
//! These traits define the boundaries between the credential lifecycle and
//! the infrastructure that persists credentials and talks to the API.

use async_trait::async_trait;
use mople_common::{CommonError, ErrorClassification, ErrorSeverity};
use mople_domain::{Credential, Result};
use thiserror::Error;
use tokio::sync::watch;

/// The current access/refresh token pair, observable and replaceable.
///
/// Readers always receive a complete pair or `None`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the current credential from storage.
    ///
    /// # Errors
    /// Returns an error if storage cannot be read or holds a value that does
    /// not deserialize into a complete pair.
    async fn current(&self) -> Result<Option<Credential>>;

    /// Replace the stored credential in one write.
    async fn replace(&self, credential: Credential) -> Result<()>;

    /// Delete the stored credential.
    async fn clear(&self) -> Result<()>;

    /// Observe the current credential; the receiver sees every replacement.
    fn subscribe(&self) -> watch::Receiver<Option<Credential>>;
}

/// Token refresh endpoint.
///
/// Called from the request-executing thread, so the call blocks.
pub trait TokenRefreshApi: Send + Sync {
    /// Exchange `refresh_token` for a new credential pair.
    ///
    /// # Errors
    /// See [`RefreshError`] for the failure taxonomy.
    fn refresh(&self, refresh_token: &str) -> std::result::Result<Credential, RefreshError>;
}

/// Why a refresh attempt produced no new credential.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Nothing to refresh with (signed out, or blank refresh token).
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The endpoint refused the refresh token (4xx); the session is over.
    #[error("Refresh token rejected (HTTP {status})")]
    Rejected { status: u16 },

    /// The endpoint failed (5xx).
    #[error("Refresh endpoint failed (HTTP {status})")]
    Server { status: u16 },

    /// Transport failure or timeout before a response arrived.
    #[error("Refresh request failed: {0}")]
    Network(String),

    /// A 2xx response whose body is not a usable credential pair.
    #[error("Malformed refresh response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl RefreshError {
    /// Whether the failure means the refresh token itself is no longer valid.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl ErrorClassification for RefreshError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Server { .. } => true,
            Self::NoRefreshToken | Self::Rejected { .. } | Self::MalformedResponse(_) => false,
            Self::Common(e) => e.is_retryable(),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoRefreshToken => ErrorSeverity::Info,
            Self::Network(_) | Self::Server { .. } => ErrorSeverity::Warning,
            Self::Rejected { .. } | Self::MalformedResponse(_) => ErrorSeverity::Error,
            Self::Common(e) => e.severity(),
        }
    }

    fn is_critical(&self) -> bool {
        match self {
            Self::Common(e) => e.is_critical(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_refresh_error_classification() {
        assert!(RefreshError::Network("reset".into()).is_retryable());
        assert!(RefreshError::Server { status: 503 }.is_retryable());
        assert!(!RefreshError::Rejected { status: 401 }.is_retryable());
        assert!(!RefreshError::NoRefreshToken.is_retryable());

        assert_eq!(RefreshError::NoRefreshToken.severity(), ErrorSeverity::Info);
        assert_eq!(RefreshError::Rejected { status: 400 }.severity(), ErrorSeverity::Error);
        assert!(RefreshError::Rejected { status: 400 }.is_rejection());
        assert!(!RefreshError::Server { status: 500 }.is_rejection());
    }

    #[test]
    fn test_common_errors_delegate() {
        let err = RefreshError::from(CommonError::async_timeout("write", Duration::from_secs(1)));
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = RefreshError::from(CommonError::internal("bug"));
        assert!(err.is_critical());
    }
}
