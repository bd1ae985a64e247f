//! # Mople Infrastructure
//!
//! Infrastructure implementations of core ports and the HTTP client stack.
//!
//! This crate contains:
//! - The blocking HTTP engine with interceptor and authenticator hooks
//! - Bearer token attachment and single-flight token refresh
//! - Memory and file-backed preference stores
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `mople-core`
//! - Depends on `mople-common`, `mople-domain` and `mople-core`
//! - Contains all "impure" code (file I/O, HTTP)

pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use auth::{BearerInterceptor, BlockingCredentials, HttpTokenRefreshApi, RefreshAuthenticator};
pub use context::ClientContext;
pub use errors::InfraError;
pub use http::{AuthenticatedClient, Authenticator, HttpClient, Interceptor, ResponseHead};
pub use storage::{FilePreferenceStore, MemoryPreferenceStore};
