//! Domain types and models

pub mod credential;
pub mod session;

pub use credential::Credential;
pub use session::SessionEvent;
