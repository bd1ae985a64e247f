//! Credential lifecycle
//!
//! ```text
//! ┌─────────────────┐
//! │   AuthSession   │  sign-in / sign-out façade, session events
//! └────────┬────────┘
//!          │
//!          └──► CredentialStore (CredentialRepository)
//!                    │
//!                    └──► PreferenceStore  (persisted key-value storage)
//! ```
//!
//! The refresh flow itself lives with the HTTP engine in `mople-infra`; it
//! depends on the [`ports::CredentialStore`] and [`ports::TokenRefreshApi`]
//! ports defined here.

pub mod ports;
pub mod repository;
pub mod session;
