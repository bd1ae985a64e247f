//! Common error types and classification
//!
//! This module provides the error vocabulary shared by the Mople crates:
//!
//! 1. **`CommonError`**: failure patterns of the runtime plumbing that more
//!    than one crate has to handle (bad configuration, runtime misuse,
//!    bridge timeouts, failed background tasks)
//!
//! 2. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability and severity
//!
//! 3. **`ErrorSeverity` enum**: one severity scale used to pick log levels
//!
//! Module-specific errors compose with `CommonError` instead of duplicating
//! its variants:
//!
//! ```rust,ignore
//! #[derive(Debug, Error)]
//! pub enum RefreshError {
//!     #[error("refresh token rejected (HTTP {status})")]
//!     Rejected { status: u16 },
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//! ```
//!
//! | Level | Use Case |
//! |-------|----------|
//! | **Info** | Expected conditions (signed out, nothing stored) |
//! | **Warning** | Degraded but recoverable (timeouts, transient network) |
//! | **Error** | Failure requiring attention (rejected credentials, bad config) |
//! | **Critical** | Integrity at risk (internal invariant violations) |

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Common error variants that appear across multiple crates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String },

    /// Lock acquisition or scheduling-domain errors
    Lock { message: String, resource: Option<String> },

    /// Async operation waited on from a blocking context and did not finish
    AsyncTimeout { future_name: String, duration: Duration },

    /// Internal errors that shouldn't normally occur
    Internal { message: String },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message } => write!(f, "Configuration error: {message}"),
            Self::Lock { message, resource } => match resource {
                Some(resource) => write!(f, "Lock error for '{resource}': {message}"),
                None => write!(f, "Lock error: {message}"),
            },
            Self::AsyncTimeout { future_name, duration } => {
                write!(f, "Async operation '{future_name}' timed out after {duration:?}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Lock { .. } | Self::AsyncTimeout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Lock { .. } | Self::AsyncTimeout { .. } => ErrorSeverity::Warning,
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

impl CommonError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn lock_resource<S: Into<String>, R: Into<String>>(resource: R, message: S) -> Self {
        Self::Lock { message: message.into(), resource: Some(resource.into()) }
    }

    pub fn async_timeout<S: Into<String>>(future_name: S, duration: Duration) -> Self {
        Self::AsyncTimeout { future_name: future_name.into(), duration }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }
}

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Standard classification interface for error types
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again: network timeouts, server errors, lock contention.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level, used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = CommonError::async_timeout("credential read", Duration::from_millis(250));
        assert_eq!(err.to_string(), "Async operation 'credential read' timed out after 250ms");

        let err = CommonError::lock_resource("tokio runtime", "nested block");
        assert_eq!(err.to_string(), "Lock error for 'tokio runtime': nested block");

        let err = CommonError::config("no tokio runtime available");
        assert_eq!(err.to_string(), "Configuration error: no tokio runtime available");
    }

    #[test]
    fn test_classification() {
        assert!(CommonError::async_timeout("read", Duration::from_secs(1)).is_retryable());
        assert!(CommonError::lock_resource("runtime", "nested").is_retryable());
        assert!(!CommonError::config("bad").is_retryable());

        assert_eq!(CommonError::config("bad").severity(), ErrorSeverity::Error);
        assert_eq!(CommonError::internal("bug").severity(), ErrorSeverity::Critical);
        assert!(CommonError::internal("bug").is_critical());
        assert!(!CommonError::async_timeout("read", Duration::from_secs(1)).is_critical());
    }

    #[test]
    fn test_severity_ordering_and_display() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
    }
}
