//! # Mople Core
//!
//! Credential lifecycle logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for key-value storage, the credential store
//!   and the token refresh endpoint
//! - The credential repository and the session façade built on them
//!
//! ## Architecture Principles
//! - Only depends on `mople-common` and `mople-domain`
//! - No file, HTTP, or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod storage;

pub use auth::ports::{CredentialStore, RefreshError, TokenRefreshApi};
pub use auth::repository::CredentialRepository;
pub use auth::session::{AuthSession, SessionNotifier};
pub use storage::ports::PreferenceStore;
